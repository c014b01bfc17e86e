//! FILENAME: tests/test_http_backend.rs
//! Integration tests for the HTTP backend against canned responses.

use dashboard_lib::{ApiConfig, ApiError, DashboardBackend, HttpBackend, ViewPersistenceClient};
use persistence::ViewSlot;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Answers one request with `200 OK` and `body`, returning the base URL.
async fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8192];
        let _ = socket.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}

fn backend(base: String) -> HttpBackend {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpBackend::with_client(ApiConfig::with_base(base), client)
}

fn slot(n: u32) -> ViewSlot {
    ViewSlot::new(n).unwrap()
}

// ============================================================================
// SAVED VIEW RESPONSES
// ============================================================================

#[tokio::test]
async fn test_not_found_pair_means_empty_slot() {
    let base = serve_once(r#"[{"error": "View not found"}, 404]"#).await;
    assert_eq!(backend(base).get_view(slot(3)).await.unwrap(), None);
}

#[tokio::test]
async fn test_not_found_pair_loads_as_not_found() {
    let base = serve_once(r#"[{"error": "View not found"}, 404]"#).await;
    let shared: Arc<dyn DashboardBackend> = Arc::new(backend(base));
    match ViewPersistenceClient::new(shared).load(4).await {
        Err(ApiError::NotFound(missing)) => assert_eq!(missing, slot(4)),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_other_error_pair_is_backend_error() {
    let base = serve_once(r#"[{"error": "Invalid slot"}, 400]"#).await;
    match backend(base).get_view(slot(2)).await {
        Err(ApiError::Backend(message)) => assert_eq!(message, "Invalid slot"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_stored_record_is_returned() {
    let base = serve_once(
        r#"{"slot": 1, "name": "Kent", "selected_columns": "site_name,county", "updated_at": "2024-05-01 10:00:00"}"#,
    )
    .await;
    let view = backend(base).get_view(slot(1)).await.unwrap().unwrap();
    assert_eq!(view.name.as_deref(), Some("Kent"));
    assert_eq!(view.selected_columns.as_deref(), Some("site_name,county"));
}
