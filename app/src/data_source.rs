//! FILENAME: app/src/data_source.rs
// PURPOSE: Where a map surface gets its rows from.
// CONTEXT: The home page map is handed rows its parent already filtered, the
// dataset pages filter a local snapshot, and saved-view maps ask the backend.
// All three return canonical rows for the same (filters, columns) input.

use crate::api_types::MapDataRequest;
use crate::backend_filters::translate;
use crate::client::DashboardBackend;
use crate::error::ApiError;
use crate::log_debug;
use async_trait::async_trait;
use engine::{AliasTable, ColumnSpec, FilterSpec, Row};
use persistence::ViewSlot;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self, filters: &FilterSpec, columns: &ColumnSpec) -> Result<Vec<Row>, ApiError>;
}

// ============================================================================
// STATIC ROWS
// ============================================================================

/// Rows supplied by the caller and already filtered; returned as they are.
#[derive(Debug, Clone)]
pub struct StaticRows {
    rows: Arc<[Row]>,
}

impl StaticRows {
    pub fn new(rows: Arc<[Row]>) -> Self {
        StaticRows { rows }
    }
}

#[async_trait]
impl DataSource for StaticRows {
    fn name(&self) -> &str {
        "static"
    }

    async fn load(&self, _filters: &FilterSpec, _columns: &ColumnSpec) -> Result<Vec<Row>, ApiError> {
        Ok(self.rows.to_vec())
    }
}

// ============================================================================
// FILTERED ROWS
// ============================================================================

/// A local snapshot filtered on every load.
#[derive(Debug, Clone)]
pub struct FilteredRows {
    rows: Arc<[Row]>,
}

impl FilteredRows {
    pub fn new(rows: Arc<[Row]>) -> Self {
        FilteredRows { rows }
    }
}

#[async_trait]
impl DataSource for FilteredRows {
    fn name(&self) -> &str {
        "filtered"
    }

    async fn load(&self, filters: &FilterSpec, columns: &ColumnSpec) -> Result<Vec<Row>, ApiError> {
        Ok(engine::apply(&self.rows, filters, columns))
    }
}

// ============================================================================
// BACKEND ROWS
// ============================================================================

/// Rows from the map-data endpoints.
///
/// Filters the backend understands are sent with the request; the residual
/// is applied to the canonicalised response.
pub struct BackendRows {
    backend: Arc<dyn DashboardBackend>,
    slot: Option<ViewSlot>,
    aliases: AliasTable,
}

impl BackendRows {
    pub fn new(backend: Arc<dyn DashboardBackend>, slot: Option<ViewSlot>) -> Self {
        BackendRows {
            backend,
            slot,
            aliases: AliasTable::default(),
        }
    }

    pub fn slot(&self) -> Option<ViewSlot> {
        self.slot
    }
}

#[async_trait]
impl DataSource for BackendRows {
    fn name(&self) -> &str {
        "backend"
    }

    async fn load(&self, filters: &FilterSpec, columns: &ColumnSpec) -> Result<Vec<Row>, ApiError> {
        let translation = translate(filters);
        let selected = if columns.is_all() {
            Vec::new()
        } else {
            columns.with_location_fields().columns().to_vec()
        };
        let request = MapDataRequest {
            filters: translation.backend,
            selected_columns: selected,
        };
        let response = self.backend.fetch_map_data(self.slot, &request).await?;
        if let Some(message) = response.error {
            return Err(ApiError::Backend(message));
        }

        let rows = self.aliases.canonicalize(response.rows);
        log_debug!(
            "FETCH",
            "map-data returned {} rows, {} residual filters",
            rows.len(),
            translation.residual.active_fields().count()
        );
        if translation.residual.is_empty() {
            Ok(rows)
        } else {
            Ok(engine::apply(&rows, &translation.residual, &ColumnSpec::all()))
        }
    }
}
