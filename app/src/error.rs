//! FILENAME: app/src/error.rs

use persistence::{ViewError, ViewSlot};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP error! status: {status} ({url})")]
    Status { status: u16, url: String },

    #[error("{0}")]
    Backend(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No saved view in slot {0}")]
    NotFound(ViewSlot),

    #[error("Request was superseded")]
    Cancelled,

    #[error(transparent)]
    View(#[from] ViewError),
}

impl ApiError {
    /// Superseded requests are dropped without surfacing anything.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                url: e.url().map(|url| url.to_string()).unwrap_or_default(),
            }
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
