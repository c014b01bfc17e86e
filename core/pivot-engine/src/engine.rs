//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - Group-by aggregation over the active dataset.
//!
//! Algorithm:
//! 1. Derive a composite key per row from the `rows` fields
//! 2. Bucket rows by key, in first-appearance order
//! 3. Feed every value field of the row into the bucket's accumulators
//! 4. Emit one output row per bucket: grouping labels, then aggregates
//!
//! `cross_tabulate` additionally splits each bucket by the `columns` fields
//! and emits one aggregate column per (column combination, value field).

use crate::accumulator::GroupAccumulator;
use crate::definition::PivotConfig;
use crate::error::PivotError;
use engine::{FieldValue, Row};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Joins grouping labels into a composite key. Unit separator (U+001F)
/// does not occur in the source data.
pub const KEY_SEPARATOR: char = '\u{1F}';

/// Group label for null, empty and marker-blank values. Emitted as "".
pub const BLANK_LABEL: &str = "(blank)";

/// Group label for rows that do not carry the grouping field at all.
pub const MISSING_LABEL: &str = "(missing)";

type Labels = SmallVec<[GroupLabel; 4]>;
type Accumulators = SmallVec<[GroupAccumulator; 4]>;

// ============================================================================
// GROUPING
// ============================================================================

/// What a row contributes to the composite key for one grouping field.
/// Blank and missing are distinct from any text, including text that reads
/// like their display labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupLabel {
    Value(String),
    Blank,
    Missing,
}

impl GroupLabel {
    /// Display text: the value itself, `(blank)` or `(missing)`.
    pub fn as_str(&self) -> &str {
        match self {
            GroupLabel::Value(text) => text,
            GroupLabel::Blank => BLANK_LABEL,
            GroupLabel::Missing => MISSING_LABEL,
        }
    }

    fn push_key(&self, key: &mut String) {
        match self {
            GroupLabel::Value(text) => {
                key.push('v');
                key.push_str(text);
            }
            GroupLabel::Blank => key.push('b'),
            GroupLabel::Missing => key.push('m'),
        }
    }

    fn output(&self) -> FieldValue {
        match self {
            GroupLabel::Blank => FieldValue::text(""),
            other => FieldValue::text(other.as_str()),
        }
    }
}

pub fn group_label(row: &Row, field: &str) -> GroupLabel {
    match row.get(field) {
        None => GroupLabel::Missing,
        Some(value) if value.is_blank() => GroupLabel::Blank,
        Some(value) => GroupLabel::Value(value.display_value()),
    }
}

fn labels_for(row: &Row, fields: &[String]) -> Labels {
    fields.iter().map(|field| group_label(row, field)).collect()
}

/// Tagged parts joined by [`KEY_SEPARATOR`].
fn composite_key(labels: &[GroupLabel]) -> String {
    let mut key = String::with_capacity(labels.iter().map(|l| l.as_str().len() + 2).sum());
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        label.push_key(&mut key);
    }
    key
}

/// Buckets keyed by composite key, kept in first-appearance order.
struct GroupIndex<T> {
    index: FxHashMap<String, usize>,
    groups: Vec<(Labels, T)>,
}

impl<T> GroupIndex<T> {
    fn new() -> Self {
        GroupIndex {
            index: FxHashMap::default(),
            groups: Vec::new(),
        }
    }

    fn entry(&mut self, labels: Labels, init: impl FnOnce() -> T) -> &mut T {
        let key = composite_key(&labels);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(key, slot);
                self.groups.push((labels, init()));
                slot
            }
        };
        &mut self.groups[slot].1
    }

    fn len(&self) -> usize {
        self.groups.len()
    }
}

// ============================================================================
// SIMPLE PIVOT
// ============================================================================

/// Groups `rows` by `config.rows` and aggregates `config.values`.
///
/// One output row per distinct composite key, in first-appearance order.
/// `config.columns` is not consulted here; see [`cross_tabulate`].
pub fn aggregate(rows: &[Row], config: &PivotConfig) -> Result<Vec<Row>, PivotError> {
    config.validate()?;
    if rows.is_empty() {
        return Err(PivotError::NoData);
    }

    let value_count = config.values.len();
    let mut groups: GroupIndex<Accumulators> = GroupIndex::new();

    for row in rows {
        let accumulators = groups.entry(labels_for(row, &config.rows), || {
            (0..value_count).map(|_| GroupAccumulator::new()).collect()
        });
        for (acc, value) in accumulators.iter_mut().zip(&config.values) {
            acc.add(row.get(&value.field));
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for (labels, accumulators) in groups.groups {
        let mut row = Row::with_capacity(config.rows.len() + value_count);
        for (field, label) in config.rows.iter().zip(labels.iter()) {
            row.insert(field.as_str(), label.output());
        }
        for (value, acc) in config.values.iter().zip(accumulators.iter()) {
            row.insert(
                config.value_column_name(value),
                FieldValue::Number(acc.result(value.aggregation)),
            );
        }
        out.push(row);
    }
    Ok(out)
}

// ============================================================================
// CROSS TABULATION
// ============================================================================

/// Header for one column combination: `"county: Kent | site_type: Primary"`.
/// Blank labels read as `Blank`.
fn column_header(fields: &[String], labels: &[GroupLabel]) -> String {
    fields
        .iter()
        .zip(labels)
        .map(|(field, label)| {
            let shown = match label {
                GroupLabel::Blank => "Blank",
                other => other.as_str(),
            };
            format!("{}: {}", field, shown)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// True two-dimensional pivot: rows grouped by `config.rows`, one aggregate
/// column per distinct combination of `config.columns` values per value
/// field, named `<header>_<field>_<AGG>`.
///
/// Combinations are ordered by first appearance across the whole input.
/// Cells with no contributing rows hold 0.
pub fn cross_tabulate(rows: &[Row], config: &PivotConfig) -> Result<Vec<Row>, PivotError> {
    config.validate()?;
    if config.columns.is_empty() {
        return Err(PivotError::NoColumnFields);
    }
    if rows.is_empty() {
        return Err(PivotError::NoData);
    }

    // Column combinations first, so every output row has the same shape.
    let mut combinations: GroupIndex<()> = GroupIndex::new();
    for row in rows {
        combinations.entry(labels_for(row, &config.columns), || ());
    }
    let column_count = combinations.len();
    let value_count = config.values.len();

    // Per row group: one accumulator per (combination, value field).
    let mut groups: GroupIndex<Vec<GroupAccumulator>> = GroupIndex::new();
    for row in rows {
        let column_labels = labels_for(row, &config.columns);
        let column_slot = combinations
            .index
            .get(&composite_key(&column_labels))
            .copied()
            .unwrap_or(0);

        let accumulators = groups.entry(labels_for(row, &config.rows), || {
            vec![GroupAccumulator::new(); column_count * value_count]
        });
        for (v, value) in config.values.iter().enumerate() {
            accumulators[column_slot * value_count + v].add(row.get(&value.field));
        }
    }

    let headers: Vec<String> = combinations
        .groups
        .iter()
        .map(|(labels, _)| column_header(&config.columns, labels))
        .collect();

    let mut out = Vec::with_capacity(groups.len());
    for (labels, accumulators) in groups.groups {
        let mut row = Row::with_capacity(config.rows.len() + accumulators.len());
        for (field, label) in config.rows.iter().zip(labels.iter()) {
            row.insert(field.as_str(), label.output());
        }
        for (c, header) in headers.iter().enumerate() {
            for (v, value) in config.values.iter().enumerate() {
                let acc = &accumulators[c * value_count + v];
                let result = if acc.rows == 0 {
                    0.0
                } else {
                    acc.result(value.aggregation)
                };
                row.insert(
                    format!("{}_{}_{}", header, value.field, value.aggregation.suffix()),
                    FieldValue::Number(result),
                );
            }
        }
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AggregationType;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("site", "A").with("type", "Primary").with("v", 10.0),
            Row::new().with("site", "B").with("type", "Grid").with("v", 5.0),
            Row::new().with("site", "A").with("type", "Grid").with("v", "20"),
        ]
    }

    fn values(rows: &[Row], field: &str) -> Vec<String> {
        rows.iter().map(|row| row.display(field)).collect()
    }

    #[test]
    fn test_sum_and_count_by_group() {
        let config = PivotConfig::new().row("site").value("v", AggregationType::Sum);
        let out = aggregate(&rows(), &config).unwrap();
        assert_eq!(values(&out, "site"), vec!["A", "B"]);
        assert_eq!(values(&out, "v"), vec!["30", "5"]);

        let config = PivotConfig::new().row("site").value("v", AggregationType::Count);
        let out = aggregate(&rows(), &config).unwrap();
        assert_eq!(values(&out, "v"), vec!["2", "1"]);
    }

    #[test]
    fn test_multiple_values_get_suffixes() {
        let config = PivotConfig::new()
            .row("site")
            .value("v", AggregationType::Min)
            .value("v", AggregationType::Max);
        let out = aggregate(&rows(), &config).unwrap();
        let names: Vec<&str> = out[0].field_names().collect();
        assert_eq!(names, vec!["site", "v_MIN", "v_MAX"]);
        assert_eq!(out[0].display("v_MIN"), "10");
        assert_eq!(out[0].display("v_MAX"), "20");
    }

    #[test]
    fn test_blank_and_missing_labels() {
        let data = vec![
            Row::new().with("site", FieldValue::Null).with("v", 1.0),
            Row::new().with("site", "N/A").with("v", 2.0),
            Row::new().with("v", 4.0),
        ];
        let config = PivotConfig::new().row("site").value("v", AggregationType::Sum);
        let out = aggregate(&data, &config).unwrap();
        assert_eq!(values(&out, "site"), vec!["", MISSING_LABEL]);
        assert_eq!(values(&out, "v"), vec!["3", "4"]);
    }

    #[test]
    fn test_label_text_does_not_merge_with_missing_or_blank() {
        let data = vec![
            Row::new().with("site", MISSING_LABEL).with("v", 1.0),
            Row::new().with("v", 2.0),
            Row::new().with("site", BLANK_LABEL).with("v", 4.0),
            Row::new().with("site", "").with("v", 8.0),
        ];
        let config = PivotConfig::new().row("site").value("v", AggregationType::Sum);
        let out = aggregate(&data, &config).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(values(&out, "v"), vec!["1", "2", "4", "8"]);
        assert_eq!(group_label(&data[1], "site"), GroupLabel::Missing);
        assert_ne!(group_label(&data[0], "site"), GroupLabel::Missing);
    }

    #[test]
    fn test_separator_prevents_key_collisions() {
        let data = vec![
            Row::new().with("a", "x|y").with("b", "z").with("v", 1.0),
            Row::new().with("a", "x").with("b", "y|z").with("v", 1.0),
        ];
        let config = PivotConfig::new()
            .row("a")
            .row("b")
            .value("v", AggregationType::Count);
        assert_eq!(aggregate(&data, &config).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PivotConfig::new().value("v", AggregationType::Sum);
        assert_eq!(aggregate(&rows(), &config), Err(PivotError::NoRowFields));

        let config = PivotConfig::new().row("site").value("v", AggregationType::Sum);
        assert_eq!(aggregate(&[], &config), Err(PivotError::NoData));
    }

    #[test]
    fn test_cross_tabulate() {
        let config = PivotConfig::new()
            .row("site")
            .column("type")
            .value("v", AggregationType::Sum);
        let out = cross_tabulate(&rows(), &config).unwrap();

        let names: Vec<&str> = out[0].field_names().collect();
        assert_eq!(
            names,
            vec!["site", "type: Primary_v_SUM", "type: Grid_v_SUM"]
        );
        assert_eq!(out[0].display("type: Primary_v_SUM"), "10");
        assert_eq!(out[0].display("type: Grid_v_SUM"), "20");
        assert_eq!(out[1].display("type: Primary_v_SUM"), "0");
        assert_eq!(out[1].display("type: Grid_v_SUM"), "5");

        let flat = PivotConfig::new().row("site").value("v", AggregationType::Sum);
        assert_eq!(cross_tabulate(&rows(), &flat), Err(PivotError::NoColumnFields));
    }
}
