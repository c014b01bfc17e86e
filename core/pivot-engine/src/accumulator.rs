//! FILENAME: core/pivot-engine/src/accumulator.rs
//! Incremental aggregate state for one (group, value field) pair.

use crate::definition::AggregationType;
use engine::FieldValue;

/// Accumulator for computing aggregates incrementally.
/// Stores the intermediate state needed for every aggregation type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    /// Rows seen, numeric or not.
    pub rows: u64,
    pub sum: f64,
    pub count_numbers: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        GroupAccumulator::default()
    }

    /// Adds one row's value. Missing, blank and non-numeric values count
    /// towards the row total only.
    pub fn add(&mut self, value: Option<&FieldValue>) {
        self.rows += 1;
        if let Some(n) = value.and_then(FieldValue::coerce_number) {
            self.add_number(n);
        }
    }

    fn add_number(&mut self, value: f64) {
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Final value for the given aggregation.
    ///
    /// AVG divides by the group's row count, not by the number of numeric
    /// values. MIN/MAX over a group without numeric values yield 0.
    pub fn result(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Sum => self.sum,
            AggregationType::Average => {
                if self.rows == 0 {
                    0.0
                } else {
                    self.sum / self.rows as f64
                }
            }
            AggregationType::Count => self.rows as f64,
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
        }
    }
}
