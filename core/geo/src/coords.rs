//! FILENAME: core/geo/src/coords.rs
//! PURPOSE: Locates a row on the map.
//! CONTEXT: Coordinates arrive in three shapes depending on the endpoint:
//! a `position` pair, separate `latitude`/`longitude` fields, or a combined
//! "lat, lng" string. Sources are tried in that order and the first one that
//! parses wins.

use engine::{FieldValue, Row};
use serde::{Deserialize, Serialize};

/// Field holding the combined "lat, lng" string after canonicalisation.
pub const SPATIAL_FIELD: &str = "spatial_coordinates";

/// The same field under the backend's human-readable heading.
pub const SPATIAL_FIELD_HEADING: &str = "Spatial Coordinates";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// Within the WGS84 bounding box. Implausible positions are still
    /// plotted; callers only warn about them.
    pub fn is_plausible(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn number(value: &FieldValue) -> Option<f64> {
    value.as_f64().and_then(finite)
}

fn from_position(row: &Row) -> Option<LatLng> {
    match row.get("position")?.as_list()? {
        [lat, lng] => Some(LatLng::new(number(lat)?, number(lng)?)),
        _ => None,
    }
}

fn from_scalars(row: &Row) -> Option<LatLng> {
    let lat = number(row.get("latitude")?)?;
    let lng = number(row.get("longitude")?)?;
    Some(LatLng::new(lat, lng))
}

/// Parses "51.5, -0.12" (the space is optional).
pub fn parse_pair(text: &str) -> Option<LatLng> {
    let mut parts = text.trim().split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok().and_then(finite)?;
    let lng = parts.next()?.trim().parse::<f64>().ok().and_then(finite)?;
    if parts.next().is_some() {
        return None;
    }
    Some(LatLng::new(lat, lng))
}

fn from_combined(row: &Row) -> Option<LatLng> {
    let value = row
        .get(SPATIAL_FIELD)
        .filter(|value| !value.is_blank())
        .or_else(|| row.get(SPATIAL_FIELD_HEADING))?;
    match value {
        FieldValue::Text(text) => parse_pair(text),
        FieldValue::List(items) => match items.as_slice() {
            [lat, lng] => Some(LatLng::new(number(lat)?, number(lng)?)),
            _ => None,
        },
        _ => None,
    }
}

/// Position of `row`, or `None` when no source yields two finite numbers.
pub fn extract(row: &Row) -> Option<LatLng> {
    from_position(row)
        .or_else(|| from_scalars(row))
        .or_else(|| from_combined(row))
}
