//! FILENAME: app/src/client.rs
// PURPOSE: Transport seam to the dashboard backend and its HTTP implementation.
// CONTEXT: Everything above this module talks to `dyn DashboardBackend`, so
// tests and offline hosts can swap in the in-memory backend.

use crate::api_types::{
    backend_error, embedded_status, MapDataRequest, MapDataResponse, ViewListResponse,
};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use engine::Row;
use persistence::{ViewSlot, WireView};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// `GET /data/<resource>`
    async fn fetch_rows(&self, resource: &str) -> Result<Vec<Row>, ApiError>;

    /// `POST /api/map-data`, or the per-view variant when `slot` is set.
    async fn fetch_map_data(
        &self,
        slot: Option<ViewSlot>,
        request: &MapDataRequest,
    ) -> Result<MapDataResponse, ApiError>;

    /// `GET /api/user/views`
    async fn list_views(&self) -> Result<Vec<WireView>, ApiError>;

    /// `GET /api/user/views/<slot>`; `None` when the slot is empty.
    async fn get_view(&self, slot: ViewSlot) -> Result<Option<WireView>, ApiError>;

    /// `POST /api/user/views/<slot>`
    async fn save_view(&self, slot: ViewSlot, view: &WireView) -> Result<(), ApiError>;

    /// `DELETE /api/user/views/<slot>`
    async fn delete_view(&self, slot: ViewSlot) -> Result<(), ApiError>;
}

// ============================================================================
// HTTP BACKEND
// ============================================================================

pub struct HttpBackend {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(HttpBackend { config, client })
    }

    /// Uses a caller-built client, e.g. one with its own proxy settings.
    pub fn with_client(config: ApiConfig, client: reqwest::Client) -> Self {
        HttpBackend { config, client }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends one request and returns the body as JSON.
    ///
    /// Non-2xx statuses and bodies carrying an `error` key both become errors.
    /// A 404, whether as the HTTP status or as the status element of a
    /// `[body, status]` pair, is reported as `Ok(None)` so callers can treat
    /// it as "absent".
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<Option<Value>, ApiError> {
        log_debug!("FETCH", "{} {}", method, url);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            log_warn!("FETCH", "{} returned {}", url, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Some(Value::Null));
        }
        let body: Value = serde_json::from_str(&text)?;
        if embedded_status(&body) == Some(StatusCode::NOT_FOUND.as_u16()) {
            log_debug!("FETCH", "{} reported not found in body", url);
            return Ok(None);
        }
        if let Some(message) = backend_error(&body) {
            log_warn!("FETCH", "{} reported error: {}", url, message);
            return Err(ApiError::Backend(message));
        }
        Ok(Some(body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>, ApiError> {
        match self.send::<Value>(Method::GET, url, None).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn fetch_rows(&self, resource: &str) -> Result<Vec<Row>, ApiError> {
        let url = self.config.url(&format!("data/{}", resource));
        match self.get_json(url.clone()).await? {
            Some(rows) => Ok(rows),
            None => Err(ApiError::Status { status: 404, url }),
        }
    }

    async fn fetch_map_data(
        &self,
        slot: Option<ViewSlot>,
        request: &MapDataRequest,
    ) -> Result<MapDataResponse, ApiError> {
        let url = match slot {
            Some(slot) => self.config.user_url(&format!("api/views/{}/map-data", slot)),
            None => self.config.url("api/map-data"),
        };
        match self.send(Method::POST, url.clone(), Some(request)).await? {
            Some(body) => Ok(serde_json::from_value(body)?),
            None => Err(ApiError::Status { status: 404, url }),
        }
    }

    async fn list_views(&self) -> Result<Vec<WireView>, ApiError> {
        let url = self.config.user_url("api/user/views");
        let list: Option<ViewListResponse> = self.get_json(url).await?;
        Ok(list.map(|list| list.views).unwrap_or_default())
    }

    async fn get_view(&self, slot: ViewSlot) -> Result<Option<WireView>, ApiError> {
        let url = self.config.user_url(&format!("api/user/views/{}", slot));
        match self.send::<Value>(Method::GET, url, None).await? {
            Some(Value::Null) | None => Ok(None),
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
        }
    }

    async fn save_view(&self, slot: ViewSlot, view: &WireView) -> Result<(), ApiError> {
        let url = self.config.user_url(&format!("api/user/views/{}", slot));
        match self.send(Method::POST, url.clone(), Some(view)).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::Status { status: 404, url }),
        }
    }

    async fn delete_view(&self, slot: ViewSlot) -> Result<(), ApiError> {
        let url = self.config.user_url(&format!("api/user/views/{}", slot));
        self.send::<Value>(Method::DELETE, url, None).await?;
        Ok(())
    }
}
