//! Therapy session browsing: month calendar, filtered session list and
//! per-session transcriptions, backed by a REST API.

pub mod calendar;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

/// Sessions shown per page of the session list.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Seconds a success or failure notice stays visible.
pub const DEFAULT_NOTICE_SECONDS: i64 = 3;
