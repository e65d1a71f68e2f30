//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_items_per_page() -> usize {
    crate::DEFAULT_ITEMS_PER_PAGE
}

fn default_notice_seconds() -> i64 {
    crate::DEFAULT_NOTICE_SECONDS
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for talking to the sessions backend and shaping the views.
pub struct ClientConfig {
    /// Base URL of the backend API, e.g. `http://localhost:3000/api`.
    pub api_url: String,
    /// Bearer token attached to every request when present.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
    /// How long success and failure notices stay visible.
    #[serde(default = "default_notice_seconds")]
    pub notice_seconds: i64,
}
