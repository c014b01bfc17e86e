//! FILENAME: core/engine/src/value.rs
//! PURPOSE: Defines the value held by a single field of a row.
//! CONTEXT: Rows arrive from the backend as flat JSON objects whose values are
//! strings, numbers or null, with the occasional coordinate pair. Every
//! consumer (filters, sorting, pivots, markers) stringifies and coerces values
//! through the helpers in this file so those rules live in one place.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text markers the source data uses to mean "no value".
pub const BLANK_MARKERS: &[&str] = &["\\N", "N/A"];

/// The value stored under one field name of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
    /// Coordinate pairs and other short sequences.
    List(Vec<FieldValue>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// True for null, whitespace-only text, the source's blank markers,
    /// NaN and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Number(n) => n.is_nan(),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || BLANK_MARKERS.contains(&trimmed)
            }
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Returns the value as the user sees it in the table.
    /// Filtering and grouping compare against this form.
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::display_value)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Strict numeric view: numbers, and text that parses as a float as-is
    /// (surrounding whitespace allowed). NaN is never returned.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if n.is_nan() {
            None
        } else {
            Some(n)
        }
    }

    /// Lenient numeric view used by aggregations: thousands separators and
    /// inner whitespace are stripped before parsing ("1,234.5" -> 1234.5).
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            FieldValue::Text(s) => {
                if self.is_blank() {
                    return None;
                }
                let cleaned: String = s
                    .chars()
                    .filter(|c| *c != ',' && !c.is_whitespace())
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
            _ => self.as_f64(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts a JSON object that is not a plain row value.
    /// `{lat, lng}`-shaped objects become a two element list, anything else
    /// is kept as its JSON text.
    fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let lat = object.get("lat").or_else(|| object.get("latitude"));
        let lng = object
            .get("lng")
            .or_else(|| object.get("lon"))
            .or_else(|| object.get("longitude"));

        match (lat, lng) {
            (Some(lat), Some(lng)) => FieldValue::List(vec![
                FieldValue::from(lat.clone()),
                FieldValue::from(lng.clone()),
            ]),
            _ => FieldValue::Text(serde_json::Value::Object(object).to_string()),
        }
    }
}

/// Formats without unnecessary decimal places.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(object) => FieldValue::from_object(object),
        }
    }
}

// ============================================================================
// SERDE
// ============================================================================

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            FieldValue::Number(_) => serializer.serialize_none(),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number, null or coordinate pair")
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldValue, D::Error> {
        FieldValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
        Ok(FieldValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
        Ok(FieldValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
        Ok(FieldValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(2));
        while let Some(item) = seq.next_element::<FieldValue>()? {
            items.push(item);
        }
        Ok(FieldValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<FieldValue, A::Error> {
        let object = serde_json::Map::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(FieldValue::from_object(object))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}
