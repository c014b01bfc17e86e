//! FILENAME: app/src/memory_backend.rs
// PURPOSE: In-process DashboardBackend for tests and offline hosts.
// CONTEXT: Mirrors the server's behaviour closely enough to exercise the
// client: map-data applies the four backend filters and returns the server's
// fixed map fields whatever columns were requested, saved views are stored as
// the same stringified records, and failures can be injected.

use crate::api_types::{MapDataRequest, MapDataResponse};
use crate::backend_filters::BackendFilters;
use crate::client::DashboardBackend;
use crate::error::ApiError;
use crate::lock;
use async_trait::async_trait;
use chrono::Utc;
use engine::Row;
use persistence::{ViewSlot, WireView};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    resources: Mutex<HashMap<String, Vec<Row>>>,
    /// Rows served by the map-data endpoints, in backend field names.
    map_rows: Mutex<Vec<Row>>,
    views: Mutex<BTreeMap<ViewSlot, WireView>>,
    fail_next: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    pub fn with_resource(self, resource: &str, rows: Vec<Row>) -> Self {
        self.set_resource(resource, rows);
        self
    }

    pub fn with_map_rows(self, rows: Vec<Row>) -> Self {
        *lock(&self.map_rows) = rows;
        self
    }

    pub fn set_resource(&self, resource: &str, rows: Vec<Row>) {
        lock(&self.resources).insert(resource.to_string(), rows);
    }

    /// Makes the next call fail with a backend error carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *lock(&self.fail_next) = Some(message.into());
    }

    /// Number of calls served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored_view(&self, slot: ViewSlot) -> Option<WireView> {
        lock(&self.views).get(&slot).cloned()
    }

    /// Overwrites a slot with a raw record, bypassing client validation.
    pub fn put_raw_view(&self, slot: ViewSlot, view: WireView) {
        lock(&self.views).insert(slot, view);
    }

    fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.fail_next).take() {
            Some(message) => Err(ApiError::Backend(message)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SERVER-SIDE FILTERING
// ============================================================================

fn backend_match(row: &Row, filters: &BackendFilters) -> bool {
    if let Some(name) = &filters.site_name {
        let site = row.display("site_name").to_lowercase();
        if !site.contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(kv) = filters.voltage_level {
        let voltage = row.get("voltage_level").and_then(|v| v.coerce_number());
        if voltage != Some(kv as f64) {
            return false;
        }
    }
    if let Some(min) = filters.available_power {
        match row.get("available_power").and_then(|v| v.coerce_number()) {
            Some(power) if power >= min => {}
            _ => return false,
        }
    }
    if let Some(operator) = &filters.network_operator {
        if row.display("network_operator") != *operator {
            return false;
        }
    }
    true
}

#[async_trait]
impl DashboardBackend for MemoryBackend {
    async fn fetch_rows(&self, resource: &str) -> Result<Vec<Row>, ApiError> {
        self.enter()?;
        lock(&self.resources)
            .get(resource)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                url: format!("/data/{}", resource),
            })
    }

    async fn fetch_map_data(
        &self,
        _slot: Option<ViewSlot>,
        request: &MapDataRequest,
    ) -> Result<MapDataResponse, ApiError> {
        self.enter()?;
        let rows: Vec<Row> = lock(&self.map_rows)
            .iter()
            .filter(|row| backend_match(row, &request.filters))
            .cloned()
            .collect();
        Ok(MapDataResponse {
            count: Some(rows.len()),
            rows,
            error: None,
        })
    }

    async fn list_views(&self) -> Result<Vec<WireView>, ApiError> {
        self.enter()?;
        Ok(lock(&self.views).values().cloned().collect())
    }

    async fn get_view(&self, slot: ViewSlot) -> Result<Option<WireView>, ApiError> {
        self.enter()?;
        Ok(lock(&self.views).get(&slot).cloned())
    }

    async fn save_view(&self, slot: ViewSlot, view: &WireView) -> Result<(), ApiError> {
        self.enter()?;
        let mut stored = view.clone();
        stored.slot = Some(slot.into());
        stored.updated_at = Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());
        lock(&self.views).insert(slot, stored);
        Ok(())
    }

    async fn delete_view(&self, slot: ViewSlot) -> Result<(), ApiError> {
        self.enter()?;
        lock(&self.views).remove(&slot);
        Ok(())
    }
}
