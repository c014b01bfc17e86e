//! FILENAME: core/geo/src/bands.rs
//! PURPOSE: Maps generation headroom to a marker colour.
//! CONTEXT: A band table is an ordered list of lower bounds, highest first.
//! The first bound the value reaches wins; values below every bound fall to
//! the floor band. Missing or unparseable headroom gets the unknown band.

use engine::FieldValue;
use serde::{Deserialize, Serialize};

pub const GREEN: &str = "#008000";
pub const AMBER: &str = "#FFA500";
pub const LIGHT_RED: &str = "#FF6B6B";
pub const RED: &str = "#FF0000";
pub const GRAY: &str = "#808080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    pub color: String,
}

impl Band {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Band {
            label: label.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    /// (inclusive lower bound, band), highest bound first.
    steps: Vec<(f64, Band)>,
    floor: Band,
    unknown: Band,
}

impl BandTable {
    pub fn new(floor: Band, unknown: Band) -> Self {
        BandTable {
            steps: Vec::new(),
            floor,
            unknown,
        }
    }

    /// Adds a band for values `>= min`. Steps are kept sorted high to low.
    pub fn step(mut self, min: f64, band: Band) -> Self {
        let at = self
            .steps
            .iter()
            .position(|(bound, _)| *bound < min)
            .unwrap_or(self.steps.len());
        self.steps.insert(at, (min, band));
        self
    }

    /// The default three-band table.
    pub fn headroom() -> Self {
        BandTable::new(Band::new("Low", RED), Band::new("Unknown", GRAY))
            .step(50.0, Band::new("High", GREEN))
            .step(20.0, Band::new("Medium", AMBER))
    }

    /// Four bands spanning negative headroom.
    pub fn wide_range() -> Self {
        BandTable::new(Band::new("Very low", RED), Band::new("Unknown", GRAY))
            .step(50.0, Band::new("High", GREEN))
            .step(0.0, Band::new("Moderate", AMBER))
            .step(-50.0, Band::new("Low", LIGHT_RED))
    }

    pub fn classify(&self, headroom: Option<f64>) -> &Band {
        let value = match headroom {
            Some(value) if !value.is_nan() => value,
            _ => return &self.unknown,
        };
        self.steps
            .iter()
            .find(|(bound, _)| value >= *bound)
            .map(|(_, band)| band)
            .unwrap_or(&self.floor)
    }

    /// Classifies a raw field value; numeric text is coerced.
    pub fn classify_value(&self, value: Option<&FieldValue>) -> &Band {
        self.classify(value.and_then(FieldValue::coerce_number))
    }

    /// Every band, highest first, then floor and unknown. For legends.
    pub fn bands(&self) -> impl Iterator<Item = &Band> {
        self.steps
            .iter()
            .map(|(_, band)| band)
            .chain([&self.floor, &self.unknown])
    }
}

impl Default for BandTable {
    fn default() -> Self {
        BandTable::headroom()
    }
}
