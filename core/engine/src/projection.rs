//! FILENAME: core/engine/src/projection.rs
//! PURPOSE: Column selection for the active dataset.
//! CONTEXT: A ColumnSpec lists the fields the user picked. An empty spec means
//! "all fields". Map and chart derivations still need to locate each row, so
//! projection always carries the location-identifying fields along even when
//! they were not picked.

use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fields that identify a row on the map. A row carrying none of them
/// cannot be placed or keyed.
pub const IDENTITY_FIELDS: &[&str] = &[
    "id",
    "site_name",
    "latitude",
    "longitude",
    "position",
    "spatial_coordinates",
];

/// Fields added to a non-empty selection before it is sent to the backend.
pub const LOCATION_FIELDS: &[&str] = &["site_name", "latitude", "longitude"];

/// Ordered list of selected field names. Empty selects every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpec(Vec<String>);

impl ColumnSpec {
    pub fn new(columns: Vec<String>) -> Self {
        ColumnSpec(columns)
    }

    pub fn all() -> Self {
        ColumnSpec(Vec::new())
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|column| column == field)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined wire form used by saved views.
    pub fn to_csv(&self) -> String {
        self.0.join(",")
    }

    /// Parses the comma-joined wire form. Blank entries are dropped.
    pub fn from_csv(text: &str) -> Self {
        ColumnSpec(
            text.split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The selection with the location fields appended when missing.
    /// An empty selection stays empty.
    pub fn with_location_fields(&self) -> Self {
        if self.is_all() {
            return self.clone();
        }
        let mut columns = self.0.clone();
        for field in LOCATION_FIELDS {
            if !self.contains(field) {
                columns.push(field.to_string());
            }
        }
        ColumnSpec(columns)
    }
}

impl From<Vec<String>> for ColumnSpec {
    fn from(columns: Vec<String>) -> Self {
        ColumnSpec(columns)
    }
}

impl<'a> From<&[&'a str]> for ColumnSpec {
    fn from(columns: &[&'a str]) -> Self {
        ColumnSpec(columns.iter().map(|c| c.to_string()).collect())
    }
}

/// True when the row carries at least one identity field.
pub fn has_identity(row: &Row) -> bool {
    IDENTITY_FIELDS.iter().any(|field| row.contains(field))
}

/// Returns a row holding the selected fields in selection order, followed by
/// any identity fields present on `row` but not selected.
pub fn project_row(row: &Row, columns: &ColumnSpec) -> Row {
    if columns.is_all() {
        return row.clone();
    }

    let mut out = Row::with_capacity(columns.len() + IDENTITY_FIELDS.len());
    for column in columns.iter() {
        if let Some(value) = row.get(column) {
            out.insert(column, value.clone());
        }
    }
    for field in IDENTITY_FIELDS {
        if !columns.contains(field) {
            if let Some(value) = row.get(field) {
                out.insert(*field, value.clone());
            }
        }
    }
    out
}

pub fn project(rows: &[Row], columns: &ColumnSpec) -> Vec<Row> {
    rows.iter().map(|row| project_row(row, columns)).collect()
}

/// Ordered header list for the table.
///
/// `order` is the user's column order (fields not in it keep their natural
/// position after the ordered ones); `hidden` holds fields toggled off.
/// Visibility only changes what is rendered, never what is fetched.
pub fn visible_columns(all: &[String], order: &[String], hidden: &HashSet<String>) -> Vec<String> {
    let known: HashSet<&str> = all.iter().map(String::as_str).collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(all.len());

    for field in order {
        if known.contains(field.as_str()) && placed.insert(field.as_str()) {
            out.push(field.clone());
        }
    }
    for field in all {
        if placed.insert(field.as_str()) {
            out.push(field.clone());
        }
    }

    out.retain(|field| !hidden.contains(field));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new()
            .with("id", 7.0)
            .with("site_name", "Ashford")
            .with("county", "Kent")
            .with("site_voltage", 33.0)
            .with("latitude", 51.1)
            .with("longitude", 0.87)
    }

    #[test]
    fn test_project_row_injects_identity_fields() {
        let columns = ColumnSpec::from(&["site_voltage", "county"][..]);
        let projected = project_row(&row(), &columns);
        let names: Vec<&str> = projected.field_names().collect();
        assert_eq!(
            names,
            vec!["site_voltage", "county", "id", "site_name", "latitude", "longitude"]
        );
    }

    #[test]
    fn test_empty_spec_is_identity() {
        assert_eq!(project_row(&row(), &ColumnSpec::all()), row());
    }

    #[test]
    fn test_csv_round_trip() {
        let columns = ColumnSpec::from_csv(" site_name, county ,,site_voltage");
        assert_eq!(columns.to_csv(), "site_name,county,site_voltage");
        assert!(ColumnSpec::from_csv("").is_all());
    }

    #[test]
    fn test_with_location_fields() {
        let columns = ColumnSpec::from(&["county", "latitude"][..]).with_location_fields();
        assert_eq!(columns.to_csv(), "county,latitude,site_name,longitude");
        assert!(ColumnSpec::all().with_location_fields().is_all());
    }

    #[test]
    fn test_visible_columns_order_and_hidden() {
        let all: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let order = vec!["c".to_string(), "zz".to_string(), "a".to_string()];
        let hidden: HashSet<String> = ["b".to_string()].into_iter().collect();
        assert_eq!(visible_columns(&all, &order, &hidden), vec!["c", "a", "d"]);
    }
}
