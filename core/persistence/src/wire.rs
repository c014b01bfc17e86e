//! FILENAME: core/persistence/src/wire.rs
//! PURPOSE: Conversion between SavedView and the backend's stored record.
//! CONTEXT: The backend keeps every sub-field as opaque text: the column
//! selection comma-joined and each config block as a JSON string. On load each
//! sub-field is parsed on its own; one that fails falls back to its default
//! and is reported as a warning, without affecting the others.

use crate::config::{ChartConfig, MapConfig, PaginationConfig, SortConfig};
use crate::error::ViewError;
use crate::slot::ViewSlot;
use crate::view::{SavedView, ViewSummary};
use engine::{ColumnSpec, FilterSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A view as the backend stores and returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub selected_columns: Option<String>,
    #[serde(default)]
    pub chart_config: Option<String>,
    #[serde(default)]
    pub filters: Option<String>,
    #[serde(default)]
    pub map_config: Option<String>,
    #[serde(default)]
    pub sort_config: Option<String>,
    #[serde(default)]
    pub pagination_config: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A sub-field that could not be parsed and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedView {
    pub view: SavedView,
    pub warnings: Vec<FieldWarning>,
}

// ============================================================================
// ENCODE
// ============================================================================

/// Builds the POST body for saving `view`. Validates first.
pub fn encode(view: &SavedView) -> Result<WireView, ViewError> {
    view.validate()?;
    Ok(WireView {
        slot: None,
        name: Some(view.name.trim().to_string()),
        selected_columns: Some(view.selected_columns.to_csv()),
        chart_config: Some(serde_json::to_string(&view.chart_config)?),
        filters: Some(serde_json::to_string(&view.filters)?),
        map_config: Some(serde_json::to_string(&view.map_config)?),
        sort_config: Some(serde_json::to_string(&view.sort_config)?),
        pagination_config: Some(serde_json::to_string(&view.pagination_config)?),
        updated_at: None,
    })
}

// ============================================================================
// DECODE
// ============================================================================

fn parse_field<T>(field: &'static str, text: Option<&str>, warnings: &mut Vec<FieldWarning>) -> T
where
    T: DeserializeOwned + Default,
{
    let text = match text.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return T::default(),
    };
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!(target: "VIEWS", "saved view field {} is malformed, using default: {}", field, e);
            warnings.push(FieldWarning {
                field,
                message: e.to_string(),
            });
            T::default()
        }
    }
}

/// Rebuilds a SavedView for `slot` from the stored record.
pub fn decode(wire: &WireView, slot: ViewSlot) -> DecodedView {
    let mut warnings = Vec::new();

    let name = wire
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| slot.default_name());

    let selected_columns = wire
        .selected_columns
        .as_deref()
        .map(ColumnSpec::from_csv)
        .unwrap_or_default();

    let filters: FilterSpec = parse_field("filters", wire.filters.as_deref(), &mut warnings);
    let chart_config: ChartConfig =
        parse_field("chart_config", wire.chart_config.as_deref(), &mut warnings);
    let map_config: MapConfig = parse_field("map_config", wire.map_config.as_deref(), &mut warnings);
    let sort_config: SortConfig =
        parse_field("sort_config", wire.sort_config.as_deref(), &mut warnings);
    let pagination_config: PaginationConfig = parse_field(
        "pagination_config",
        wire.pagination_config.as_deref(),
        &mut warnings,
    );

    DecodedView {
        view: SavedView {
            slot,
            name,
            selected_columns,
            filters,
            chart_config,
            map_config,
            sort_config,
            pagination_config,
            updated_at: wire.updated_at.clone(),
        },
        warnings,
    }
}

/// Summary for the slot picker. Records whose slot is missing or out of
/// range are dropped.
pub fn summarize(wire: &WireView) -> Option<ViewSummary> {
    let slot = match wire.slot.map(ViewSlot::new) {
        Some(Ok(slot)) => slot,
        _ => {
            log::warn!(target: "VIEWS", "ignoring saved view with slot {:?}", wire.slot);
            return None;
        }
    };
    let decoded = decode(wire, slot);
    Some(ViewSummary::from(&decoded.view))
}
