//! FILENAME: app/src/status.rs
// PURPOSE: Loading and error state for one dashboard surface.
// CONTEXT: Errors are sticky until the next successful operation on the same
// surface; a failure never clears the data already on screen.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStatus {
    pub loading: bool,
    pub error: Option<String>,
    /// When the surface last received good data.
    pub updated_at: Option<DateTime<Utc>>,
}

impl SurfaceStatus {
    pub fn begin(&mut self) {
        self.loading = true;
    }

    pub fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
        self.updated_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn has_data(&self) -> bool {
        self.updated_at.is_some()
    }
}
