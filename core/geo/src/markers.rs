//! FILENAME: core/geo/src/markers.rs
//! PURPOSE: Builds the marker list for the map from the active dataset.
//! CONTEXT: Markers are always rebuilt as a fresh list. Rows without a usable
//! position are skipped (they still show in the table and chart). Positions
//! outside the WGS84 box are kept but reported.

use crate::bands::BandTable;
use crate::coords::{extract, LatLng};
use engine::Row;
use serde::Serialize;

/// Headroom field after alias canonicalisation.
pub const HEADROOM_FIELD: &str = "generation_headroom_mw";

/// Fallback name for rows without a site name.
pub const UNKNOWN_SITE: &str = "Unknown Site";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// The row's `id` field when present, otherwise its index in the input.
    pub id: String,
    pub position: LatLng,
    pub color: String,
    pub band: String,
    pub headroom: Option<f64>,
    pub site_name: String,
    /// The full source row, for the details panel.
    pub fields: Row,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerSet {
    pub markers: Vec<Marker>,
    /// Rows with no extractable position.
    pub skipped: usize,
    /// Markers whose position lies outside the WGS84 box.
    pub implausible: usize,
}

impl MarkerSet {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn marker_id(row: &Row, index: usize) -> String {
    match row.get("id") {
        Some(id) if !id.is_blank() => id.display_value(),
        _ => index.to_string(),
    }
}

/// One marker per locatable row, coloured by `bands`.
pub fn build_markers(rows: &[Row], bands: &BandTable) -> MarkerSet {
    let mut set = MarkerSet::default();

    for (index, row) in rows.iter().enumerate() {
        let Some(position) = extract(row) else {
            set.skipped += 1;
            continue;
        };

        let id = marker_id(row, index);
        if !position.is_plausible() {
            set.implausible += 1;
            log::warn!(
                target: "MAP",
                "marker {} has out-of-range position ({}, {})",
                id,
                position.lat,
                position.lng
            );
        }

        let headroom_value = row.get(HEADROOM_FIELD);
        let band = bands.classify_value(headroom_value);
        let site_name = if row.has_value("site_name") {
            row.display("site_name")
        } else {
            UNKNOWN_SITE.to_string()
        };

        set.markers.push(Marker {
            id,
            position,
            color: band.color.clone(),
            band: band.label.clone(),
            headroom: headroom_value.and_then(|value| value.coerce_number()),
            site_name,
            fields: row.clone(),
        });
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::{AMBER, GRAY, GREEN};
    use engine::FieldValue;

    #[test]
    fn test_build_markers() {
        let rows = vec![
            Row::new()
                .with("id", 42.0)
                .with("site_name", "Ashford")
                .with("latitude", 51.1)
                .with("longitude", 0.87)
                .with(HEADROOM_FIELD, 60.0),
            Row::new().with("site_name", "Nowhere"),
            Row::new()
                .with("spatial_coordinates", "51.3, 0.5")
                .with(HEADROOM_FIELD, "25"),
            Row::new()
                .with("site_name", "Odd")
                .with("latitude", 120.0)
                .with("longitude", 0.0)
                .with(HEADROOM_FIELD, FieldValue::Null),
        ];

        let set = build_markers(&rows, &BandTable::headroom());
        assert_eq!(set.len(), 3);
        assert_eq!(set.skipped, 1);
        assert_eq!(set.implausible, 1);

        assert_eq!(set.markers[0].id, "42");
        assert_eq!(set.markers[0].color, GREEN);
        assert_eq!(set.markers[0].headroom, Some(60.0));

        assert_eq!(set.markers[1].id, "2");
        assert_eq!(set.markers[1].site_name, UNKNOWN_SITE);
        assert_eq!(set.markers[1].color, AMBER);

        assert_eq!(set.markers[2].color, GRAY);
        assert_eq!(set.markers[2].headroom, None);
    }
}
