//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PivotError {
    #[error("pivot needs at least one row field")]
    NoRowFields,
    #[error("pivot needs at least one value field")]
    NoValueFields,
    #[error("cross tabulation needs at least one column field")]
    NoColumnFields,
    #[error("no rows to aggregate")]
    NoData,
    #[error("unknown aggregation: {0}")]
    UnknownAggregation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("no data to chart")]
    NoData,
    #[error("chart needs an x axis field")]
    MissingXAxis,
    #[error("{0} chart needs a y axis field")]
    MissingYAxis(String),
}
