//! FILENAME: app/src/config.rs
// PURPOSE: Backend connection settings and URL construction.
// CONTEXT: The API base comes from the API_BASE environment variable. When it
// is unset the dashboard talks to its own origin through relative paths.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API base resolved once per process.
static API_BASE: Lazy<String> = Lazy::new(|| std::env::var("API_BASE").unwrap_or_default());

pub const DEFAULT_USER_ID: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Empty or "/" means relative URLs.
    pub api_base: String,
    pub user_id: u32,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_base: String::new(),
            user_id: DEFAULT_USER_ID,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            page_size: engine::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Defaults with the base taken from `API_BASE`.
    pub fn from_env() -> Self {
        ApiConfig {
            api_base: API_BASE.clone(),
            ..ApiConfig::default()
        }
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        ApiConfig {
            api_base: base.into(),
            ..ApiConfig::default()
        }
    }

    /// Builds the full URL for `endpoint`.
    ///
    /// Absolute endpoints pass through untouched. Otherwise the base and the
    /// endpoint are joined with exactly one slash between them.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let endpoint = endpoint.trim_start_matches('/');
        let base = self.api_base.trim_end_matches('/');
        if base.is_empty() {
            format!("/{}", endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    /// Like `url` with the `user_id` query parameter appended.
    pub fn user_url(&self, endpoint: &str) -> String {
        format!("{}?user_id={}", self.url(endpoint), self.user_id)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
