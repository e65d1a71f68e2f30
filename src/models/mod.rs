//! Backend wire models and client configuration.

pub mod config;
pub mod session;
