//! FILENAME: app/src/api_types.rs
// PURPOSE: Request and response bodies exchanged with the dashboard backend.
// CONTEXT: Backend records use snake_case field names, matching the Python
// service, so nothing here renames fields.

use crate::backend_filters::BackendFilters;
use engine::Row;
use persistence::WireView;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/map-data` and `POST /api/views/<slot>/map-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDataRequest {
    pub filters: BackendFilters,
    pub selected_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDataResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /api/user/views`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewListResponse {
    #[serde(default)]
    pub views: Vec<WireView>,
}

/// Extracts the backend's error message from a response body.
///
/// The backend reports failures either as `{"error": "..."}` or, from some
/// handlers, as a `[{"error": "..."}, status]` pair. Both count as errors
/// whatever the HTTP status was.
pub fn backend_error(body: &Value) -> Option<String> {
    let object = match body {
        Value::Object(_) => body,
        Value::Array(items) => items.first()?,
        _ => return None,
    };
    match object.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// The status element of a `[body, status]` pair, if the body has that shape.
pub fn embedded_status(body: &Value) -> Option<u16> {
    match body.as_array()?.as_slice() {
        [_, status] => status.as_u64().and_then(|code| u16::try_from(code).ok()),
        _ => None,
    }
}
