//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for dashboard integration tests.

#![allow(dead_code)]

use dashboard_lib::{
    create_dashboard_state, ApiConfig, DashboardBackend, DashboardState, MemoryBackend, Outcome,
};
use engine::{FieldValue, Row};
use std::sync::Arc;

/// Test harness wiring a DashboardState to an in-memory backend.
pub struct TestHarness {
    pub backend: Arc<MemoryBackend>,
    pub state: DashboardState,
}

impl TestHarness {
    /// Create a harness whose backend serves the substation fixture.
    pub fn new() -> Self {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_resource("map", SubstationFixture::rows())
                .with_map_rows(SubstationFixture::map_rows()),
        );
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Arc<MemoryBackend>) -> Self {
        let shared: Arc<dyn DashboardBackend> = backend.clone();
        TestHarness {
            state: create_dashboard_state(ApiConfig::default(), shared),
            backend,
        }
    }

    /// Create a harness with the fixture rows already loaded.
    pub async fn loaded() -> Self {
        let harness = Self::new();
        let count = harness.load().await;
        assert_eq!(count, SubstationFixture::rows().len());
        harness
    }

    /// Load the "map" resource and return the row count.
    pub async fn load(&self) -> usize {
        match self.state.load_rows("map").await {
            Outcome::Current(Ok(count)) => count,
            other => panic!("unexpected load outcome: {:?}", other),
        }
    }

    /// Site names of the active rows, in order.
    pub fn active_site_names(&self) -> Vec<String> {
        self.state
            .active_rows()
            .iter()
            .map(|row| row.display("site_name"))
            .collect()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Substations as `/data/map` serves them, with display headings as keys.
pub struct SubstationFixture;

impl SubstationFixture {
    pub fn rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("id", 1.0)
                .with("Site Name", "Alpha")
                .with("County", "Kent")
                .with("Licence Area", "UKPN")
                .with("Site Voltage", 33.0)
                .with("Generation Headroom Mw", 75.0)
                .with("Spatial Coordinates", "51.5, -0.12"),
            Row::new()
                .with("id", 2.0)
                .with("Site Name", "Beta")
                .with("County", "Kent")
                .with("Licence Area", "UKPN")
                .with("Site Voltage", 11.0)
                .with("Generation Headroom Mw", 30.0)
                .with("Latitude", 51.3)
                .with("Longitude", 0.5),
            Row::new()
                .with("id", 3.0)
                .with("Site Name", "Gamma")
                .with("County", "Surrey")
                .with("Licence Area", "SSEN")
                .with("Site Voltage", 33.0)
                .with("Generation Headroom Mw", "10")
                .with("Spatial Coordinates", "51.2,-0.3"),
            Row::new()
                .with("id", 4.0)
                .with("Site Name", "Delta")
                .with("County", "Surrey")
                .with("Licence Area", "SSEN")
                .with("Site Voltage", 11.0)
                .with("Generation Headroom Mw", FieldValue::Null),
            Row::new()
                .with("id", 5.0)
                .with("Site Name", "Epsilon")
                .with("County", "Essex")
                .with("Licence Area", "UKPN")
                .with("Site Voltage", 132.0)
                .with("Generation Headroom Mw", "N/A")
                .with("Spatial Coordinates", "51.7, 0.4"),
        ]
    }

    /// The same sites as the map-data endpoints return them.
    pub fn map_rows() -> Vec<Row> {
        vec![
            Self::map_row("Alpha", 51.5, -0.12, 75.0, 33.0, "UKPN"),
            Self::map_row("Beta", 51.3, 0.5, 30.0, 11.0, "UKPN"),
            Self::map_row("Gamma", 51.2, -0.3, 10.0, 33.0, "SSEN"),
            Self::map_row("Epsilon", 51.7, 0.4, 0.0, 132.0, "UKPN"),
        ]
    }

    fn map_row(name: &str, lat: f64, lng: f64, power: f64, kv: f64, operator: &str) -> Row {
        Row::new()
            .with("site_name", name)
            .with("latitude", lat)
            .with("longitude", lng)
            .with("available_power", power)
            .with("voltage_level", kv)
            .with("network_operator", operator)
    }
}
