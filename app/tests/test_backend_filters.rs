//! FILENAME: tests/test_backend_filters.rs
//! Integration tests for map rows fetched through the map-data endpoints.

mod common;

use common::SubstationFixture;
use dashboard_lib::{ApiError, BackendRows, DashboardBackend, DataSource, MemoryBackend};
use engine::{ColumnSpec, FilterSpec, FilterValue, Row};
use std::sync::Arc;

fn source() -> (Arc<MemoryBackend>, BackendRows) {
    let backend = Arc::new(MemoryBackend::new().with_map_rows(SubstationFixture::map_rows()));
    let shared: Arc<dyn DashboardBackend> = backend.clone();
    (backend, BackendRows::new(shared, None))
}

fn names(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|row| row.display("site_name")).collect()
}

#[tokio::test]
async fn test_backend_and_residual_filters_combine() {
    let (backend, source) = source();
    let mut filters = FilterSpec::new().with("site_voltage", FilterValue::any_of(["33"]));
    filters.set_global("gam");

    let rows = source.load(&filters, &ColumnSpec::all()).await.unwrap();
    assert_eq!(names(&rows), vec!["Gamma"]);
    assert_eq!(
        rows[0].get("generation_headroom_mw").and_then(|v| v.as_f64()),
        Some(10.0)
    );
    assert!(rows[0].get("available_power").is_none());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_minimum_power_and_operator() {
    let (_backend, source) = source();
    let filters = FilterSpec::new()
        .with("available_power", FilterValue::Text("20".to_string()))
        .with("licence_area", FilterValue::any_of(["UKPN"]));

    let rows = source.load(&filters, &ColumnSpec::all()).await.unwrap();
    assert_eq!(names(&rows), vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_unrepresentable_filter_applied_locally() {
    let (_backend, source) = source();
    let filters = FilterSpec::new().with("licence_area", FilterValue::any_of(["UKPN", "SSEN"]));

    let rows = source.load(&filters, &ColumnSpec::all()).await.unwrap();
    assert_eq!(rows.len(), 4);

    let filters = FilterSpec::new().with("site_name", FilterValue::any_of(["beta"]));
    let rows = source.load(&filters, &ColumnSpec::all()).await.unwrap();
    assert_eq!(names(&rows), vec!["Beta"]);
}

#[tokio::test]
async fn test_backend_error_is_reported() {
    let (backend, source) = source();
    backend.fail_next("Database error");
    match source.load(&FilterSpec::new(), &ColumnSpec::all()).await {
        Err(ApiError::Backend(message)) => assert_eq!(message, "Database error"),
        other => panic!("unexpected result: {:?}", other),
    }
}
