//! FILENAME: app/src/views.rs
// PURPOSE: Save, load, reset and list the user's saved views.
// CONTEXT: Validation and encoding live in the persistence crate; this module
// adds the round trips. Loads run on their own request channel so picking a
// second slot while the first is loading discards the first.

use crate::client::DashboardBackend;
use crate::error::ApiError;
use crate::requests::{Outcome, RequestSupervisor};
use crate::{log_enter, log_exit, log_info, log_warn};
use persistence::{decode, encode, summarize, DecodedView, SavedView, ViewSlot, ViewSummary};
use std::sync::Arc;

pub struct ViewPersistenceClient {
    backend: Arc<dyn DashboardBackend>,
    loads: RequestSupervisor,
}

impl ViewPersistenceClient {
    pub fn new(backend: Arc<dyn DashboardBackend>) -> Self {
        ViewPersistenceClient {
            backend,
            loads: RequestSupervisor::new("views"),
        }
    }

    /// Stores `view` in `slot`.
    ///
    /// Out-of-range slots and views failing validation are rejected before
    /// anything is sent.
    pub async fn save(&self, slot: u32, view: &SavedView) -> Result<(), ApiError> {
        log_enter!("VIEWS", "save", "slot={}", slot);
        let slot = ViewSlot::new(slot)?;
        let mut view = view.clone();
        view.slot = slot;
        let wire = encode(&view)?;
        self.backend.save_view(slot, &wire).await?;
        log_exit!("VIEWS", "save", "slot={} columns={}", slot, view.selected_columns.len());
        Ok(())
    }

    /// Fetches and decodes the view in `slot`.
    ///
    /// Sub-fields that fail to parse come back as defaults and are listed in
    /// the result's warnings. Returns `ApiError::Cancelled` when a newer load
    /// started first.
    pub async fn load(&self, slot: u32) -> Result<DecodedView, ApiError> {
        log_enter!("VIEWS", "load", "slot={}", slot);
        let slot = ViewSlot::new(slot)?;
        let wire = match self.loads.run(self.backend.get_view(slot)).await {
            Outcome::Current(result) => result?,
            Outcome::Superseded => return Err(ApiError::Cancelled),
        };
        let wire = wire.ok_or(ApiError::NotFound(slot))?;

        let decoded = decode(&wire, slot);
        for warning in &decoded.warnings {
            log_warn!("VIEWS", "slot {} {}: {}", slot, warning.field, warning.message);
        }
        log_exit!("VIEWS", "load", "slot={} name={}", slot, decoded.view.name);
        Ok(decoded)
    }

    /// Clears `slot` on the backend.
    pub async fn reset(&self, slot: u32) -> Result<(), ApiError> {
        let slot = ViewSlot::new(slot)?;
        self.loads.cancel();
        self.backend.delete_view(slot).await?;
        log_info!("VIEWS", "slot {} reset", slot);
        Ok(())
    }

    /// Summaries of the occupied slots, in slot order.
    pub async fn list(&self) -> Result<Vec<ViewSummary>, ApiError> {
        let mut summaries: Vec<ViewSummary> = self
            .backend
            .list_views()
            .await?
            .iter()
            .filter_map(summarize)
            .collect();
        summaries.sort_by_key(|summary| summary.slot);
        Ok(summaries)
    }
}
