//! FILENAME: core/persistence/src/lib.rs
//! Saved View Persistence
//!
//! Models the five numbered view slots and converts saved views to and from
//! the text record the backend stores. No I/O happens here; the app crate
//! owns the HTTP round trips.

mod config;
mod error;
mod slot;
mod view;
mod wire;

pub use config::{
    ChartConfig, MapConfig, PaginationConfig, SortColumn, SortConfig, DEFAULT_LOCATION_COLUMN,
};
pub use error::ViewError;
pub use slot::ViewSlot;
pub use view::{SavedView, ViewSummary};
pub use wire::{decode, encode, summarize, DecodedView, FieldWarning, WireView};
