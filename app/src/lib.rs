//! FILENAME: app/src/lib.rs
// PURPOSE: Main library entry point (composition root).
// CONTEXT: DashboardState owns the row store, the injected caches and the
// per-surface adapters, and routes every user change through the ViewState
// reducer so the table, chart and map always derive from the same state.

use engine::{ColumnSpec, DistinctValues, Row, RowStore, TableConsumer, TableSnapshot, TableState};
use geo::{IconCache, HEADROOM_FIELD};
use persistence::{FieldWarning, ViewSlot, ViewSummary};
use pivot_engine::{
    aggregate, chart_series, cross_tabulate, top_n_by, ChartError, ChartPoint, PivotConfig,
    PivotError,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub mod api_types;
pub mod backend_filters;
pub mod cache;
pub mod client;
pub mod config;
pub mod data_source;
pub mod error;
pub mod logging;
pub mod map;
pub mod memory_backend;
pub mod requests;
pub mod status;
pub mod view_state;
pub mod views;

pub use api_types::{
    backend_error, embedded_status, MapDataRequest, MapDataResponse, ViewListResponse,
};
pub use backend_filters::{translate, BackendFilters, Translation};
pub use cache::{cache_key, CacheStats, ResponseCache, TtlCache};
pub use client::{DashboardBackend, HttpBackend};
pub use config::ApiConfig;
pub use data_source::{BackendRows, DataSource, FilteredRows, StaticRows};
pub use error::ApiError;
pub use logging::{format_line, next_seq, write_log};
pub use map::MapAdapter;
pub use memory_backend::MemoryBackend;
pub use requests::{Outcome, RequestSupervisor, RequestTicket};
pub use status::SurfaceStatus;
pub use view_state::{ViewAction, ViewState};
pub use views::ViewPersistenceClient;

/// Resource loaded when the host does not name one.
pub const DEFAULT_RESOURCE: &str = "map";

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ============================================================================
// DASHBOARD STATE
// ============================================================================

pub struct DashboardState {
    config: ApiConfig,
    backend: Arc<dyn DashboardBackend>,
    cache: Arc<dyn ResponseCache>,
    icons: Arc<IconCache>,
    store: Mutex<RowStore>,
    view: Mutex<ViewState>,
    table: Mutex<TableState>,
    rows_channel: RequestSupervisor,
    rows_status: Mutex<SurfaceStatus>,
    chart_status: Mutex<SurfaceStatus>,
    map: MapAdapter,
    views: ViewPersistenceClient,
}

/// Builds the dashboard around `backend` with a fresh response cache.
pub fn create_dashboard_state(config: ApiConfig, backend: Arc<dyn DashboardBackend>) -> DashboardState {
    DashboardState::with_cache(config, backend, Arc::new(TtlCache::new()))
}

impl DashboardState {
    pub fn with_cache(
        config: ApiConfig,
        backend: Arc<dyn DashboardBackend>,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        log_info!("SYS", "Creating DashboardState (api base '{}')", config.api_base);
        let icons = Arc::new(IconCache::new());
        let store = RowStore::new(DEFAULT_RESOURCE);
        let map = MapAdapter::new(Arc::new(FilteredRows::new(store.snapshot())), Arc::clone(&icons));
        DashboardState {
            view: Mutex::new(ViewState::with_page_size(config.page_size)),
            table: Mutex::new(TableState::new(store.snapshot())),
            store: Mutex::new(store),
            views: ViewPersistenceClient::new(Arc::clone(&backend)),
            rows_channel: RequestSupervisor::new("rows"),
            rows_status: Mutex::new(SurfaceStatus::default()),
            chart_status: Mutex::new(SurfaceStatus::default()),
            config,
            backend,
            cache,
            icons,
            map,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    pub fn icons(&self) -> &Arc<IconCache> {
        &self.icons
    }

    pub fn map(&self) -> &MapAdapter {
        &self.map
    }

    // ------------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------------

    /// Loads `resource` into the row store, through the response cache.
    ///
    /// A failed load keeps the previous rows and marks the table surface as
    /// errored; a load overtaken by a newer one changes nothing.
    pub async fn load_rows(&self, resource: &str) -> Outcome<Result<usize, ApiError>> {
        log_enter!("FETCH", "load_rows", "resource={}", resource);
        let key = cache_key(&self.config.url(&format!("data/{}", resource)), &serde_json::Value::Null);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<Vec<Row>>(cached) {
                Ok(rows) => {
                    self.rows_channel.cancel();
                    log_debug!("FETCH", "{} served from cache", resource);
                    let count = self.install_rows(resource, rows, None).unwrap_or_default();
                    return Outcome::Current(Ok(count));
                }
                Err(e) => {
                    log_warn!("FETCH", "dropping unreadable cache entry {}: {}", key, e);
                    self.cache.invalidate(&key);
                }
            }
        }

        lock(&self.rows_status).begin();
        let ticket = self.rows_channel.begin();
        let result = match self
            .rows_channel
            .run_ticket(&ticket, self.backend.fetch_rows(resource))
            .await
        {
            Outcome::Current(result) => result,
            Outcome::Superseded => return Outcome::Superseded,
        };

        match result {
            Ok(rows) => {
                let value = serde_json::to_value(&rows);
                let count = match self.install_rows(resource, rows, Some(&ticket)) {
                    Some(count) => count,
                    None => return Outcome::Superseded,
                };
                match value {
                    Ok(value) => self.cache.insert(key, value, self.cache_ttl()),
                    Err(e) => log_warn!("FETCH", "response for {} not cached: {}", resource, e),
                }
                log_exit!("FETCH", "load_rows", "{} rows", count);
                Outcome::Current(Ok(count))
            }
            Err(e) => {
                if !self.rows_channel.is_current(&ticket) {
                    return Outcome::Superseded;
                }
                log_error!("FETCH", "loading {} failed: {}", resource, e);
                lock(&self.rows_status).fail(e.to_string());
                Outcome::Current(Err(e))
            }
        }
    }

    fn cache_ttl(&self) -> Duration {
        self.config.cache_ttl()
    }

    /// Replaces the dataset. With a `ticket`, nothing is installed unless it
    /// is still the newest request on the rows channel when the store lock is
    /// taken; `None` is returned in that case.
    fn install_rows(&self, resource: &str, rows: Vec<Row>, ticket: Option<&RequestTicket>) -> Option<usize> {
        let (snapshot, count) = {
            let mut store = lock(&self.store);
            if let Some(ticket) = ticket {
                if !self.rows_channel.is_current(ticket) {
                    log_debug!("FETCH", "dropping superseded rows for {}", resource);
                    return None;
                }
            }
            if store.resource() != resource {
                *store = RowStore::with_aliases(resource, store.aliases().clone());
            }
            store.replace(rows);
            (store.snapshot(), store.len())
        };
        lock(&self.table).set_rows(Arc::clone(&snapshot));
        let view = self.view_state();
        self.map.set_source(self.map_source(&view, snapshot));
        lock(&self.rows_status).succeed();
        self.sync_table_pagination();
        Some(count)
    }

    /// Shows `rows` on the map as given, bypassing the filters.
    pub fn pin_map_rows(&self, rows: Vec<Row>) {
        let rows = lock(&self.store).aliases().canonicalize(rows);
        self.map.set_source(Arc::new(StaticRows::new(Arc::from(rows))));
    }

    /// Rows admitted by the current filters and column selection.
    pub fn active_rows(&self) -> Vec<Row> {
        let snapshot = lock(&self.store).snapshot();
        let view = self.view_state();
        engine::apply(&snapshot, &view.filters, &view.columns)
    }

    pub fn field_names(&self) -> Vec<String> {
        lock(&self.store).field_names()
    }

    /// Values offered by the column filter dropdown for `field`.
    pub fn distinct_values(&self, field: &str) -> DistinctValues {
        lock(&self.store).distinct_values(field)
    }

    pub fn rows_status(&self) -> SurfaceStatus {
        lock(&self.rows_status).clone()
    }

    // ------------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------------

    pub fn view_state(&self) -> ViewState {
        lock(&self.view).clone()
    }

    /// Applies `action` and pushes the result to the table and map.
    pub fn dispatch(&self, action: ViewAction) -> ViewState {
        let (previous, next) = {
            let mut view = lock(&self.view);
            let next = view.reduce(action);
            let previous = std::mem::replace(&mut *view, next.clone());
            (previous, next)
        };

        lock(&self.table).restore(
            next.filters.clone(),
            next.sort.clone(),
            next.columns.clone(),
            next.pagination,
        );
        if previous.active_view != next.active_view {
            let snapshot = lock(&self.store).snapshot();
            self.map.set_source(self.map_source(&next, snapshot));
        }
        self.sync_table_pagination();
        self.view_state()
    }

    /// The table clamps the page index to the rows it has; keep the view in
    /// step with it.
    fn sync_table_pagination(&self) {
        let pagination = lock(&self.table).pagination();
        let mut view = lock(&self.view);
        if view.pagination != pagination {
            view.pagination = pagination;
        }
    }

    fn map_source(&self, view: &ViewState, snapshot: Arc<[Row]>) -> Arc<dyn DataSource> {
        match view.active_view {
            Some(slot) => Arc::new(BackendRows::new(Arc::clone(&self.backend), Some(slot))),
            None => Arc::new(FilteredRows::new(snapshot)),
        }
    }

    // ------------------------------------------------------------------------
    // Table
    // ------------------------------------------------------------------------

    pub fn table_snapshot(&self) -> TableSnapshot {
        lock(&self.table).snapshot()
    }

    pub fn subscribe_table(&self, consumer: impl TableConsumer + Send + 'static) {
        lock(&self.table).subscribe(consumer);
    }

    pub fn visible_columns(&self) -> Vec<String> {
        lock(&self.table).visible_columns()
    }

    // ------------------------------------------------------------------------
    // Chart and pivot
    // ------------------------------------------------------------------------

    /// Series for the configured chart over the active rows.
    pub fn chart_series(&self) -> Result<Vec<ChartPoint>, ChartError> {
        let request = self.view_state().chart.to_request();
        let result = chart_series(&self.active_rows(), &request);
        let mut status = lock(&self.chart_status);
        match &result {
            Ok(_) => status.succeed(),
            Err(e) => status.fail(e.to_string()),
        }
        result
    }

    /// Group-by over the active rows; a config with column fields produces
    /// the cross tabulation instead.
    pub fn pivot(&self, config: &PivotConfig) -> Result<Vec<Row>, PivotError> {
        let rows = self.active_rows();
        let result = if config.columns.is_empty() {
            aggregate(&rows, config)
        } else {
            cross_tabulate(&rows, config)
        };
        let mut status = lock(&self.chart_status);
        match &result {
            Ok(_) => status.succeed(),
            Err(e) => status.fail(e.to_string()),
        }
        result
    }

    /// Sites with the most generation headroom.
    pub fn top_sites(&self, n: usize) -> Vec<ChartPoint> {
        top_n_by(&self.active_rows(), "site_name", HEADROOM_FIELD, n)
    }

    pub fn chart_status(&self) -> SurfaceStatus {
        lock(&self.chart_status).clone()
    }

    // ------------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------------

    pub async fn refresh_map(&self) -> Outcome<Result<usize, ApiError>> {
        let view = self.view_state();
        self.map.refresh(&view.filters, &view.columns).await
    }

    // ------------------------------------------------------------------------
    // Saved views
    // ------------------------------------------------------------------------

    /// Saves the current state into `slot` and makes it the active view.
    pub async fn save_view(&self, slot: u32, name: &str) -> Result<(), ApiError> {
        let view_slot = ViewSlot::new(slot)?;
        let view = self.view_state().to_saved_view(view_slot, name);
        self.views.save(slot, &view).await?;
        self.dispatch(ViewAction::ApplySavedView(view));
        Ok(())
    }

    /// Loads `slot` and applies it in one step. Returns the sub-fields that
    /// had to fall back to defaults.
    pub async fn load_view(&self, slot: u32) -> Result<Vec<FieldWarning>, ApiError> {
        let decoded = self.views.load(slot).await?;
        self.dispatch(ViewAction::ApplySavedView(decoded.view));
        Ok(decoded.warnings)
    }

    pub async fn reset_view(&self, slot: u32) -> Result<(), ApiError> {
        let view_slot = ViewSlot::new(slot)?;
        self.views.reset(slot).await?;
        self.dispatch(ViewAction::ResetView(view_slot));
        Ok(())
    }

    pub async fn list_views(&self) -> Result<Vec<ViewSummary>, ApiError> {
        self.views.list().await
    }

    /// The column selection the map requests when it asks the backend.
    pub fn map_columns(&self) -> ColumnSpec {
        self.view_state().columns.with_location_fields()
    }
}
