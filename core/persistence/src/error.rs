//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Slot must be between 1 and 5, got {0}")]
    InvalidSlot(u32),

    #[error("View name cannot be empty")]
    EmptyName,

    #[error("Select at least one column before saving a view")]
    NoColumnsSelected,

    #[error("Chart {axis} axis '{column}' is not among the selected columns")]
    AxisNotSelected { axis: &'static str, column: String },

    #[error("Failed to encode view: {0}")]
    Encode(#[from] serde_json::Error),
}
