//! FILENAME: core/engine/src/sort.rs
//! PURPOSE: Multi-key, stable row sorting for the table.
//! CONTEXT: The first key of a SortSpec is primary. Numbers order before
//! text, text compares case-insensitively, and blank values always sink to
//! the end regardless of direction.

use crate::row::Row;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        self == SortDirection::Desc
    }

    pub fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort keys; the first one is primary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    pub fn new() -> Self {
        SortSpec(Vec::new())
    }

    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec(vec![SortKey {
            field: field.into(),
            direction,
        }])
    }

    /// Appends a secondary key.
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        self.0.retain(|key| key.field != field);
        self.0.push(SortKey { field, direction });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn primary(&self) -> Option<&SortKey> {
        self.0.first()
    }

    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.0
            .iter()
            .find(|key| key.field == field)
            .map(|key| key.direction)
    }

    /// Header click: unsorted -> asc -> desc -> unsorted for `field`, which
    /// becomes the only key.
    pub fn cycle(&self, field: &str) -> SortSpec {
        match self.next_direction(field) {
            Some(direction) => SortSpec::by(field, direction),
            None => SortSpec::new(),
        }
    }

    /// Shift-click: like `cycle` but other keys are kept behind the new
    /// primary.
    pub fn cycle_multi(&self, field: &str) -> SortSpec {
        let rest = self.0.iter().filter(|key| key.field != field).cloned();
        match self.next_direction(field) {
            Some(direction) => {
                let mut keys = vec![SortKey {
                    field: field.to_string(),
                    direction,
                }];
                keys.extend(rest);
                SortSpec(keys)
            }
            None => SortSpec(rest.collect()),
        }
    }

    fn next_direction(&self, field: &str) -> Option<SortDirection> {
        match self.direction_of(field) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        }
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        SortSpec(keys)
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

fn rank(value: Option<&FieldValue>) -> u8 {
    match value {
        Some(value) if value.is_blank() => 2,
        None => 2,
        Some(value) if value.as_f64().is_some() => 0,
        Some(_) => 1,
    }
}

/// Compares two field values in ascending order with blanks last.
pub fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    let (rank_a, rank_b) = (rank(a), rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(a), Some(b)) if rank_a == 0 => {
            let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(a), Some(b)) if rank_a == 1 => a
            .display_value()
            .to_lowercase()
            .cmp(&b.display_value().to_lowercase()),
        _ => Ordering::Equal,
    }
}

fn compare_rows(a: &Row, b: &Row, spec: &SortSpec) -> Ordering {
    for key in spec.keys() {
        let (va, vb) = (a.get(&key.field), b.get(&key.field));
        let ordering = compare_values(va, vb);
        let both_present = rank(va) < 2 && rank(vb) < 2;
        let ordering = if key.direction.is_desc() && both_present {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sorts rows in place. Equal rows keep their relative order.
pub fn sort_rows(rows: &mut [Row], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, spec));
}

/// Sorts a list of indices into `rows`. Equal rows keep their relative order.
pub fn sort_indices(rows: &[Row], indices: &mut [usize], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    indices.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], spec));
}
