//! FILENAME: tests/test_map.rs
//! Integration tests for the map adapter: supersession and last-good markers.

mod common;

use async_trait::async_trait;
use common::SubstationFixture;
use dashboard_lib::{ApiError, DataSource, MapAdapter, Outcome};
use engine::{AliasTable, ColumnSpec, FilterSpec, Row};
use geo::{BandTable, IconCache};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

enum Step {
    Rows(Vec<Row>),
    Fail(&'static str),
    Hang,
}

/// Replays a fixed list of responses, one per load.
struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(ScriptedSource {
            steps: Mutex::new(steps.into()),
        })
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn load(&self, _filters: &FilterSpec, _columns: &ColumnSpec) -> Result<Vec<Row>, ApiError> {
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Rows(rows)) => Ok(rows),
            Some(Step::Fail(message)) => Err(ApiError::Backend(message.to_string())),
            Some(Step::Hang) | None => std::future::pending().await,
        }
    }
}

fn fixture_rows() -> Vec<Row> {
    AliasTable::substation().canonicalize(SubstationFixture::rows())
}

fn adapter(steps: Vec<Step>) -> MapAdapter {
    MapAdapter::new(ScriptedSource::new(steps), Arc::new(IconCache::new()))
}

// ============================================================================
// SUPERSESSION TESTS
// ============================================================================

#[tokio::test]
async fn test_newer_refresh_wins() {
    let adapter = adapter(vec![Step::Hang, Step::Rows(fixture_rows())]);
    let filters = FilterSpec::new();
    let columns = ColumnSpec::all();

    let (first, second) = tokio::join!(adapter.refresh(&filters, &columns), async {
        tokio::task::yield_now().await;
        adapter.refresh(&filters, &columns).await
    });

    assert!(first.is_superseded());
    assert!(matches!(second, Outcome::Current(Ok(4))));
    assert_eq!(adapter.markers().len(), 4);
    assert!(!adapter.status().loading);
}

#[tokio::test]
async fn test_source_swap_drops_in_flight_refresh() {
    let adapter = Arc::new(adapter(vec![Step::Hang]));
    let filters = FilterSpec::new();
    let columns = ColumnSpec::all();

    let (stale, ()) = tokio::join!(adapter.refresh(&filters, &columns), async {
        tokio::task::yield_now().await;
        adapter.set_source(ScriptedSource::new(vec![Step::Rows(fixture_rows())]));
    });
    assert!(stale.is_superseded());
    assert!(adapter.markers().is_empty());

    adapter.refresh(&filters, &columns).await;
    assert_eq!(adapter.markers().len(), 4);
}

// ============================================================================
// FAILURE TESTS
// ============================================================================

#[tokio::test]
async fn test_failure_keeps_last_good_markers() {
    let adapter = adapter(vec![
        Step::Rows(fixture_rows()),
        Step::Fail("HTTP error! status: 502"),
        Step::Rows(fixture_rows()[..2].to_vec()),
    ]);
    let filters = FilterSpec::new();
    let columns = ColumnSpec::all();

    adapter.refresh(&filters, &columns).await;
    assert_eq!(adapter.markers().len(), 4);

    let failed = adapter.refresh(&filters, &columns).await;
    assert!(matches!(failed, Outcome::Current(Err(ApiError::Backend(_)))));
    assert_eq!(adapter.markers().len(), 4);
    assert_eq!(
        adapter.status().error.as_deref(),
        Some("HTTP error! status: 502")
    );

    adapter.refresh(&filters, &columns).await;
    assert_eq!(adapter.markers().len(), 2);
    assert_eq!(adapter.status().error, None);
}

#[tokio::test]
async fn test_custom_band_table() {
    let adapter = MapAdapter::with_bands(
        ScriptedSource::new(vec![Step::Rows(fixture_rows())]),
        Arc::new(IconCache::new()),
        BandTable::wide_range(),
    );
    adapter.refresh(&FilterSpec::new(), &ColumnSpec::all()).await;

    let markers = adapter.markers();
    let bands: Vec<&str> = markers.markers.iter().map(|m| m.band.as_str()).collect();
    assert_eq!(bands, vec!["High", "Moderate", "Moderate", "Unknown"]);
}
