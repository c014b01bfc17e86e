//! FILENAME: core/engine/src/filter.rs
//! PURPOSE: Declarative row filtering shared by the table, map and chart.
//! CONTEXT: A FilterSpec maps field names to constraints. Text constraints
//! are case-insensitive substring matches, list constraints are
//! case-insensitive equality against any element, and the reserved `_global`
//! key matches when any field of the row contains the text. All constraints
//! are ANDed. Filtering is a pure function over a row slice and keeps the
//! relative order of the rows it admits.

use crate::projection::{has_identity, ColumnSpec};
use crate::row::Row;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved filter key for the search-everything box.
pub const GLOBAL_FILTER_KEY: &str = "_global";

/// List token that selects rows whose value is blank.
pub const BLANKS_TOKEN: &str = "(Blanks)";

// ============================================================================
// FILTER VALUES
// ============================================================================

/// One constraint on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Case-insensitive substring match.
    Text(String),
    /// Case-insensitive equality with at least one element.
    AnyOf(Vec<String>),
}

impl FilterValue {
    pub fn any_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::AnyOf(values.into_iter().map(Into::into).collect())
    }

    /// A blank string or an empty list constrains nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::AnyOf(values) => values.is_empty(),
        }
    }

    /// Returns the single value this constraint pins the field to, if any.
    pub fn single_value(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
            FilterValue::AnyOf(values) if values.len() == 1 => Some(values[0].as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// FILTER SPEC
// ============================================================================

/// The complete set of active constraints.
///
/// Serialises as a flat JSON object, e.g.
/// `{"county": ["Kent"], "_global": "abc"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSpec {
    constraints: BTreeMap<String, FilterValue>,
}

impl FilterSpec {
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Replaces the constraint on `field`. A blank constraint removes it.
    pub fn set(&mut self, field: impl Into<String>, value: FilterValue) {
        let field = field.into();
        if value.is_blank() {
            self.constraints.remove(&field);
        } else {
            self.constraints.insert(field, value);
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        self.constraints.remove(field)
    }

    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn without(mut self, field: &str) -> Self {
        self.remove(field);
        self
    }

    pub fn set_global(&mut self, text: impl Into<String>) {
        self.set(GLOBAL_FILTER_KEY, FilterValue::Text(text.into()));
    }

    pub fn global(&self) -> Option<&str> {
        match self.constraints.get(GLOBAL_FILTER_KEY) {
            Some(FilterValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.constraints.get(field)
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    /// True when no constraint would reject any row.
    pub fn is_empty(&self) -> bool {
        self.constraints.values().all(FilterValue::is_blank)
    }

    /// Field names with a non-blank constraint, `_global` excluded.
    pub fn active_fields(&self) -> impl Iterator<Item = &str> {
        self.constraints
            .iter()
            .filter(|(field, value)| field.as_str() != GLOBAL_FILTER_KEY && !value.is_blank())
            .map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.constraints
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }

    /// Tests a single row against every constraint.
    pub fn matches(&self, row: &Row) -> bool {
        CompiledFilter::new(self).matches(row)
    }
}

impl<'de> Deserialize<'de> for FilterSpec {
    /// Lenient: numbers and booleans become one-element lists, null and
    /// nested objects are skipped. Saved views written by older clients
    /// carry all of these shapes.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        let object = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut spec = FilterSpec::new();
        for (field, value) in object {
            let value = match value {
                Value::String(text) => FilterValue::Text(text),
                Value::Number(n) => FilterValue::AnyOf(vec![n.to_string()]),
                Value::Bool(b) => FilterValue::AnyOf(vec![b.to_string()]),
                Value::Array(items) => FilterValue::AnyOf(
                    items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            Value::Number(n) => Some(n.to_string()),
                            Value::Bool(b) => Some(b.to_string()),
                            _ => None,
                        })
                        .collect(),
                ),
                Value::Null | Value::Object(_) => continue,
            };
            if field.is_empty() {
                return Err(D::Error::custom("filter field name must not be empty"));
            }
            spec.set(field, value);
        }
        Ok(spec)
    }
}

// ============================================================================
// MATCHING
// ============================================================================

enum Constraint {
    Contains(String),
    OneOf { values: Vec<String>, blanks: bool },
}

/// A FilterSpec with its needles lower-cased once, for scanning many rows.
pub struct CompiledFilter<'a> {
    fields: Vec<(&'a str, Constraint)>,
    global: Option<String>,
}

impl<'a> CompiledFilter<'a> {
    pub fn new(spec: &'a FilterSpec) -> Self {
        let mut fields = Vec::new();
        let mut global = None;

        for (field, value) in spec.iter() {
            if value.is_blank() {
                continue;
            }
            if field == GLOBAL_FILTER_KEY {
                if let FilterValue::Text(text) = value {
                    global = Some(text.trim().to_lowercase());
                }
                continue;
            }
            let constraint = match value {
                FilterValue::Text(text) => Constraint::Contains(text.trim().to_lowercase()),
                FilterValue::AnyOf(values) => Constraint::OneOf {
                    values: values.iter().map(|v| v.trim().to_lowercase()).collect(),
                    blanks: values.iter().any(|v| v == BLANKS_TOKEN),
                },
            };
            fields.push((field, constraint));
        }

        CompiledFilter { fields, global }
    }

    pub fn matches(&self, row: &Row) -> bool {
        for (field, constraint) in &self.fields {
            let value = row.get(field);
            let ok = match constraint {
                Constraint::Contains(needle) => match value {
                    Some(value) if !value.is_null() => {
                        value.display_value().to_lowercase().contains(needle.as_str())
                    }
                    _ => false,
                },
                Constraint::OneOf { values, blanks } => match value {
                    Some(value) if !value.is_null() => {
                        let text = value.display_value().trim().to_lowercase();
                        values.iter().any(|candidate| *candidate == text)
                            || (*blanks && value.is_blank())
                    }
                    _ => *blanks,
                },
            };
            if !ok {
                return false;
            }
        }

        match &self.global {
            Some(needle) => row
                .values()
                .any(|value| value.display_value().to_lowercase().contains(needle.as_str())),
            None => true,
        }
    }
}

/// Indices of the rows admitted by `spec` and `columns`, in input order.
pub fn matching_indices(rows: &[Row], spec: &FilterSpec, columns: &ColumnSpec) -> Vec<usize> {
    let compiled = CompiledFilter::new(spec);
    let require_identity = !columns.is_all();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| !require_identity || has_identity(row))
        .filter(|(_, row)| compiled.matches(row))
        .map(|(index, _)| index)
        .collect()
}

/// Returns the rows admitted by `spec`. A non-empty `columns` additionally
/// drops rows that carry no identity field at all; no field is stripped.
pub fn apply(rows: &[Row], spec: &FilterSpec, columns: &ColumnSpec) -> Vec<Row> {
    matching_indices(rows, spec, columns)
        .into_iter()
        .map(|index| rows[index].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("site_name", "Ashford")
                .with("county", "Kent")
                .with("site_voltage", 33.0),
            Row::new()
                .with("site_name", "Bexley")
                .with("county", "London")
                .with("site_voltage", 132.0),
            Row::new()
                .with("site_name", "Canterbury")
                .with("county", "kent")
                .with("site_voltage", 11.0),
            Row::new()
                .with("site_name", "Dover")
                .with("county", FieldValue::Null)
                .with("site_voltage", 33.0),
        ]
    }

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|row| row.display("site_name")).collect()
    }

    #[test]
    fn test_text_filter_is_case_insensitive_substring() {
        let spec = FilterSpec::new().with("site_name", FilterValue::Text("BURY".into()));
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Canterbury"]);
    }

    #[test]
    fn test_list_filter_matches_any_element() {
        let spec = FilterSpec::new().with("county", FilterValue::any_of(["KENT", "London"]));
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Ashford", "Bexley", "Canterbury"]);
    }

    #[test]
    fn test_list_filter_compares_stringified_numbers() {
        let spec = FilterSpec::new().with("site_voltage", FilterValue::any_of(["33"]));
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Ashford", "Dover"]);
    }

    #[test]
    fn test_missing_field_fails_text_constraint() {
        let spec = FilterSpec::new().with("county", FilterValue::Text("n".into()));
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Ashford", "Bexley", "Canterbury"]);
    }

    #[test]
    fn test_blanks_token_selects_blank_values() {
        let spec = FilterSpec::new().with("county", FilterValue::any_of([BLANKS_TOKEN]));
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Dover"]);
    }

    #[test]
    fn test_list_matches_blank_marker_text() {
        let rows = vec![
            Row::new().with("status", "N/A"),
            Row::new().with("status", "Live"),
            Row::new(),
        ];
        let spec = FilterSpec::new().with("status", FilterValue::any_of(["n/a"]));
        assert_eq!(apply(&rows, &spec, &ColumnSpec::all()).len(), 1);

        let spec = FilterSpec::new().with("status", FilterValue::any_of([BLANKS_TOKEN]));
        assert_eq!(apply(&rows, &spec, &ColumnSpec::all()).len(), 2);
    }

    #[test]
    fn test_global_matches_any_field() {
        let mut spec = FilterSpec::new();
        spec.set_global("132");
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Bexley"]);

        spec.set_global("   ");
        assert!(spec.is_empty());
        assert_eq!(apply(&rows(), &spec, &ColumnSpec::all()).len(), 4);
    }

    #[test]
    fn test_constraints_and_together() {
        let mut spec = FilterSpec::new().with("county", FilterValue::any_of(["kent"]));
        spec.set_global("ash");
        let out = apply(&rows(), &spec, &ColumnSpec::all());
        assert_eq!(names(&out), vec!["Ashford"]);
    }

    #[test]
    fn test_apply_is_idempotent_and_monotonic() {
        let all = rows();
        let loose = FilterSpec::new().with("county", FilterValue::any_of(["kent", "london"]));
        let tight = loose.clone().with("site_voltage", FilterValue::Text("3".into()));

        let once = apply(&all, &loose, &ColumnSpec::all());
        let twice = apply(&once, &loose, &ColumnSpec::all());
        assert_eq!(once, twice);

        let narrowed = apply(&all, &tight, &ColumnSpec::all());
        assert!(narrowed.len() <= once.len());
        assert!(narrowed.iter().all(|row| once.contains(row)));
    }

    #[test]
    fn test_column_spec_drops_rows_without_identity() {
        let mut all = rows();
        all.push(Row::new().with("county", "Kent"));
        let columns = ColumnSpec::new(vec!["county".to_string()]);

        let out = apply(&all, &FilterSpec::new(), &columns);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|row| row.contains("site_voltage")));
    }

    #[test]
    fn test_deserialize_is_lenient() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"county": ["Kent", 3], "site_voltage": 33, "odd": {"a": 1}, "gone": null, "_global": "x"}"#,
        )
        .unwrap();

        assert_eq!(spec.get("county"), Some(&FilterValue::any_of(["Kent", "3"])));
        assert_eq!(spec.get("site_voltage"), Some(&FilterValue::any_of(["33"])));
        assert!(spec.get("odd").is_none());
        assert!(spec.get("gone").is_none());
        assert_eq!(spec.global(), Some("x"));

        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"_global":"x","county":["Kent","3"],"site_voltage":["33"]}"#
        );
    }
}
