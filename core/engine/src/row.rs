//! FILENAME: core/engine/src/row.rs
//! PURPOSE: Defines the schema-less record that flows through the pipeline.
//! CONTEXT: A row is an ordered list of (field name, value) pairs. Field order
//! follows the source document so that "all columns" views show fields in the
//! order the backend sent them. Rows hold a few dozen fields at most, so
//! lookups are linear scans.

use crate::value::FieldValue;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record of the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Row { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// True when the field exists and holds a non-blank value.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).map_or(false, |value| !value.is_blank())
    }

    /// Inserts or replaces a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(index).1)
    }

    /// The stringified value of a field; missing fields read as "".
    pub fn display(&self, name: &str) -> String {
        self.get(name)
            .map(FieldValue::display_value)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value.into());
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

// ============================================================================
// SERDE
// ============================================================================

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object of field values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Row, A::Error> {
        let mut row = Row::with_capacity(map.size_hint().unwrap_or(16));
        while let Some((name, value)) = map.next_entry::<String, FieldValue>()? {
            row.insert(name, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}
