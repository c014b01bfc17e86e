//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot:
//! which fields group the rows and which fields are aggregated, and how.
//! These structures are designed to be:
//! - Serializable (they travel inside chart/pivot requests)
//! - Immutable snapshots of user intent

use crate::error::PivotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
/// Wire names are upper-case (`SUM`, `AVG`, ...); parsing ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    #[serde(rename = "SUM", alias = "sum", alias = "Sum")]
    Sum,
    #[serde(rename = "AVG", alias = "avg", alias = "Avg", alias = "AVERAGE")]
    Average,
    #[serde(rename = "COUNT", alias = "count", alias = "Count")]
    Count,
    #[serde(rename = "MIN", alias = "min", alias = "Min")]
    Min,
    #[serde(rename = "MAX", alias = "max", alias = "Max")]
    Max,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    pub const ALL: [AggregationType; 5] = [
        AggregationType::Sum,
        AggregationType::Average,
        AggregationType::Count,
        AggregationType::Min,
        AggregationType::Max,
    ];

    /// Upper-case wire name, also used as the output column suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            AggregationType::Sum => "SUM",
            AggregationType::Average => "AVG",
            AggregationType::Count => "COUNT",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
        }
    }

    /// Human label for headers ("Sum", "Avg", ...).
    pub fn label(self) -> &'static str {
        match self {
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Avg",
            AggregationType::Count => "Count",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for AggregationType {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" => Ok(AggregationType::Sum),
            "AVG" | "AVERAGE" => Ok(AggregationType::Average),
            "COUNT" => Ok(AggregationType::Count),
            "MIN" => Ok(AggregationType::Min),
            "MAX" => Ok(AggregationType::Max),
            _ => Err(PivotError::UnknownAggregation(s.to_string())),
        }
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// A field placed in the Values area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueField {
    pub field: String,
    #[serde(default)]
    pub aggregation: AggregationType,
}

impl ValueField {
    pub fn new(field: impl Into<String>, aggregation: AggregationType) -> Self {
        ValueField {
            field: field.into(),
            aggregation,
        }
    }
}

/// The complete pivot configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Grouping fields, outermost first.
    pub rows: Vec<String>,
    /// Column dimension. Only `cross_tabulate` reads it.
    #[serde(default)]
    pub columns: Vec<String>,
    pub values: Vec<ValueField>,
}

impl PivotConfig {
    pub fn new() -> Self {
        PivotConfig::default()
    }

    pub fn row(mut self, field: impl Into<String>) -> Self {
        self.rows.push(field.into());
        self
    }

    pub fn column(mut self, field: impl Into<String>) -> Self {
        self.columns.push(field.into());
        self
    }

    pub fn value(mut self, field: impl Into<String>, aggregation: AggregationType) -> Self {
        self.values.push(ValueField::new(field, aggregation));
        self
    }

    /// `rows` and `values` must both be non-empty.
    pub fn validate(&self) -> Result<(), PivotError> {
        if self.rows.is_empty() {
            return Err(PivotError::NoRowFields);
        }
        if self.values.is_empty() {
            return Err(PivotError::NoValueFields);
        }
        Ok(())
    }

    /// Output column name for a value field.
    /// A single value field keeps its name; several get an aggregation suffix.
    pub fn value_column_name(&self, value: &ValueField) -> String {
        if self.values.len() > 1 {
            format!("{}_{}", value.field, value.aggregation.suffix())
        } else {
            value.field.clone()
        }
    }

    /// Every field the configuration references.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        let all = self
            .rows
            .iter()
            .chain(self.columns.iter())
            .chain(self.values.iter().map(|v| &v.field));
        for field in all {
            if !fields.contains(&field.as_str()) {
                fields.push(field.as_str());
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_parsing_is_case_insensitive() {
        assert_eq!("avg".parse::<AggregationType>(), Ok(AggregationType::Average));
        assert_eq!(" Max ".parse::<AggregationType>(), Ok(AggregationType::Max));
        assert!("median".parse::<AggregationType>().is_err());
    }

    #[test]
    fn test_config_wire_shape() {
        let config: PivotConfig = serde_json::from_str(
            r#"{"rows": ["county"], "values": [{"field": "headroom", "aggregation": "sum"}]}"#,
        )
        .unwrap();
        assert!(config.columns.is_empty());
        assert_eq!(config.values[0].aggregation, AggregationType::Sum);

        let json = serde_json::to_string(&config.values[0]).unwrap();
        assert_eq!(json, r#"{"field":"headroom","aggregation":"SUM"}"#);
    }

    #[test]
    fn test_validate_and_column_names() {
        assert_eq!(PivotConfig::new().validate(), Err(PivotError::NoRowFields));
        assert_eq!(
            PivotConfig::new().row("county").validate(),
            Err(PivotError::NoValueFields)
        );

        let config = PivotConfig::new()
            .row("county")
            .value("headroom", AggregationType::Sum)
            .value("headroom", AggregationType::Average);
        assert_eq!(config.value_column_name(&config.values[1]), "headroom_AVG");
        assert_eq!(config.referenced_fields(), vec!["county", "headroom"]);
    }
}
