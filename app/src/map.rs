//! FILENAME: app/src/map.rs
// PURPOSE: The per-surface adapter that turns a DataSource into map markers.
// CONTEXT: Each refresh runs on the map-data channel, so only the newest
// request can replace the markers. A failed refresh keeps the last good set
// on screen and records the error.

use crate::data_source::DataSource;
use crate::error::ApiError;
use crate::requests::{Outcome, RequestSupervisor};
use crate::status::SurfaceStatus;
use crate::lock;
use crate::{log_debug, log_info, log_warn};
use engine::{ColumnSpec, FilterSpec};
use geo::{build_markers, BandTable, IconCache, Marker, MarkerIcon, MarkerSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MapSurface {
    markers: Arc<MarkerSet>,
    status: SurfaceStatus,
}

pub struct MapAdapter {
    source: Mutex<Arc<dyn DataSource>>,
    bands: BandTable,
    icons: Arc<IconCache>,
    supervisor: RequestSupervisor,
    surface: Mutex<MapSurface>,
}

impl MapAdapter {
    pub fn new(source: Arc<dyn DataSource>, icons: Arc<IconCache>) -> Self {
        MapAdapter::with_bands(source, icons, BandTable::headroom())
    }

    pub fn with_bands(source: Arc<dyn DataSource>, icons: Arc<IconCache>, bands: BandTable) -> Self {
        MapAdapter {
            source: Mutex::new(source),
            bands,
            icons,
            supervisor: RequestSupervisor::new("map-data"),
            surface: Mutex::new(MapSurface::default()),
        }
    }

    fn surface(&self) -> MutexGuard<'_, MapSurface> {
        lock(&self.surface)
    }

    /// Swaps the row source and drops any refresh still reading the old one.
    pub fn set_source(&self, source: Arc<dyn DataSource>) {
        self.supervisor.cancel();
        *lock(&self.source) = source;
    }

    pub fn source(&self) -> Arc<dyn DataSource> {
        Arc::clone(&*lock(&self.source))
    }

    /// Reloads rows for `filters` and rebuilds the markers.
    ///
    /// Returns the new marker count, or the error that left the previous
    /// markers in place.
    pub async fn refresh(
        &self,
        filters: &FilterSpec,
        columns: &ColumnSpec,
    ) -> Outcome<Result<usize, ApiError>> {
        let source = self.source();
        log_debug!("MAP", "refresh from {} source", source.name());
        self.surface().status.begin();

        let outcome = self.supervisor.run(source.load(filters, columns)).await;
        let result = match outcome {
            Outcome::Current(result) => result,
            Outcome::Superseded => return Outcome::Superseded,
        };

        let mut surface = self.surface();
        match result {
            Ok(rows) => {
                let markers = build_markers(&rows, &self.bands);
                let count = markers.len();
                log_info!(
                    "MAP",
                    "{} markers from {} rows ({} without position)",
                    count,
                    rows.len(),
                    markers.skipped
                );
                surface.markers = Arc::new(markers);
                surface.status.succeed();
                Outcome::Current(Ok(count))
            }
            Err(e) => {
                log_warn!(
                    "MAP",
                    "refresh failed, keeping {} markers: {}",
                    surface.markers.len(),
                    e
                );
                surface.status.fail(e.to_string());
                Outcome::Current(Err(e))
            }
        }
    }

    /// The markers currently on screen.
    pub fn markers(&self) -> Arc<MarkerSet> {
        Arc::clone(&self.surface().markers)
    }

    pub fn status(&self) -> SurfaceStatus {
        self.surface().status.clone()
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    pub fn icon_for(&self, marker: &Marker) -> Arc<MarkerIcon> {
        self.icons.get_or_create(&marker.color)
    }
}
