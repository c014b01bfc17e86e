//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot and chart subsystem for the dashboard.
//!
//! This crate aggregates the active dataset into pivot rows and chart
//! series. It depends on `engine` only for shared types (Row, FieldValue).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `accumulator`: Per-group aggregate state (HOW we compute)
//! - `engine`: Group-by and cross tabulation (HOW we calculate)
//! - `chart`: Chart series derivation (WHAT the chart is fed)

pub mod accumulator;
pub mod chart;
pub mod definition;
pub mod engine;
pub mod error;

pub use accumulator::GroupAccumulator;
pub use chart::{chart_series, top_n_by, ChartPoint, ChartRequest, ChartType};
pub use definition::*;
pub use crate::engine::{
    aggregate, cross_tabulate, group_label, GroupLabel, BLANK_LABEL, KEY_SEPARATOR, MISSING_LABEL,
};
pub use error::{ChartError, PivotError};
