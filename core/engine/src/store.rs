//! FILENAME: core/engine/src/store.rs
//! PURPOSE: Holds the raw dataset for one backend resource.
//! CONTEXT: The store is replaced wholesale on every successful fetch; rows
//! are never edited in place. Consumers take an `Arc` snapshot so a late
//! reader never observes a half-swapped dataset.

use crate::alias::AliasTable;
use crate::row::Row;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One distinct stringified value of a column and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistinctValue {
    pub value: String,
    pub count: usize,
}

/// The multi-select options for a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistinctValues {
    /// Non-blank values, sorted case-insensitively.
    pub values: Vec<DistinctValue>,
    /// Rows whose value is blank or missing.
    pub blank_count: usize,
}

impl DistinctValues {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values
            .iter()
            .any(|distinct| distinct.value.eq_ignore_ascii_case(value))
    }
}

/// Raw dataset for a single resource (`transformers`, `map`, ...).
#[derive(Debug, Clone)]
pub struct RowStore {
    resource: String,
    rows: Arc<[Row]>,
    generation: u64,
    aliases: AliasTable,
}

impl RowStore {
    pub fn new(resource: impl Into<String>) -> Self {
        Self::with_aliases(resource, AliasTable::default())
    }

    pub fn with_aliases(resource: impl Into<String>, aliases: AliasTable) -> Self {
        RowStore {
            resource: resource.into(),
            rows: Arc::from(Vec::new()),
            generation: 0,
            aliases,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Swaps the whole dataset, canonicalising field names on the way in.
    /// Returns the new generation.
    pub fn replace(&mut self, rows: Vec<Row>) -> u64 {
        let rows = self.aliases.canonicalize(rows);
        self.rows = Arc::from(rows);
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Cheap shared handle to the current dataset.
    pub fn snapshot(&self) -> Arc<[Row]> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Superset of field names across all rows, in first-seen order.
    pub fn field_names(&self) -> Vec<String> {
        field_names(&self.rows)
    }

    pub fn distinct_values(&self, field: &str) -> DistinctValues {
        distinct_values(&self.rows, field)
    }
}

/// Superset of field names across `rows`, in first-seen order.
pub fn field_names(rows: &[Row]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for row in rows {
        for name in row.field_names() {
            if seen.insert(name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Distinct stringified values of `field` with their row counts.
/// Values differing only by case are counted together under the first
/// spelling encountered.
pub fn distinct_values(rows: &[Row], field: &str) -> DistinctValues {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut values: Vec<DistinctValue> = Vec::new();
    let mut blank_count = 0;

    for row in rows {
        let value = match row.get(field) {
            Some(value) if !value.is_blank() => value.display_value(),
            _ => {
                blank_count += 1;
                continue;
            }
        };

        match index.get(&value.to_lowercase()) {
            Some(&i) => values[i].count += 1,
            None => {
                index.insert(value.to_lowercase(), values.len());
                values.push(DistinctValue { value, count: 1 });
            }
        }
    }

    values.sort_by(|a, b| {
        a.value
            .to_lowercase()
            .cmp(&b.value.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });

    DistinctValues {
        values,
        blank_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn sample() -> Vec<Row> {
        vec![
            Row::new().with("Site Name", "Alpha").with("County", "Kent"),
            Row::new()
                .with("site_name", "Beta")
                .with("County", "kent")
                .with("Postcode", "ME1"),
            Row::new().with("site_name", "Gamma").with("County", FieldValue::Null),
            Row::new().with("site_name", "Delta").with("County", "Surrey"),
        ]
    }

    #[test]
    fn test_replace_bumps_generation_and_canonicalises() {
        let mut store = RowStore::new("transformers");
        assert_eq!(store.generation(), 0);

        let generation = store.replace(sample());
        assert_eq!(generation, 1);
        assert_eq!(store.len(), 4);
        assert_eq!(store.rows()[0].display("site_name"), "Alpha");

        let snapshot = store.snapshot();
        store.replace(Vec::new());
        assert_eq!(store.generation(), 2);
        assert!(store.is_empty());
        assert_eq!(snapshot.len(), 4);
    }

    #[test]
    fn test_field_names_first_seen_order() {
        let mut store = RowStore::new("transformers");
        store.replace(sample());
        assert_eq!(store.field_names(), vec!["site_name", "county", "postcode"]);
    }

    #[test]
    fn test_distinct_values_counts_and_blanks() {
        let mut store = RowStore::new("transformers");
        store.replace(sample());

        let distinct = store.distinct_values("county");
        assert_eq!(distinct.blank_count, 1);
        assert_eq!(
            distinct.values,
            vec![
                DistinctValue { value: "Kent".to_string(), count: 2 },
                DistinctValue { value: "Surrey".to_string(), count: 1 },
            ]
        );
        assert!(distinct.contains("KENT"));
    }
}
