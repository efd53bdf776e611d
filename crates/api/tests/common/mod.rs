#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use interio_api::config::{AssetConfig, ServerConfig, SdConfig, SkyboxConfig};
use interio_api::notifications::NotificationRelay;
use interio_api::router::build_app_router;
use interio_api::state::AppState;
use interio_providers::fetch::AssetFetcher;

/// Smallest payload that sniffs as JPEG.
pub const JPEG_A: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', b'A'];
/// A second, distinguishable JPEG payload.
pub const JPEG_B: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', b'B'];

/// Nothing listens here; requests to it fail fast with connection refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Build a test `ServerConfig` rooted at `asset_dir`.
///
/// Every external service points at [`UNREACHABLE`]; tests that need one
/// overwrite the matching field with a fake server's URL.
pub fn test_config(asset_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        assets: AssetConfig {
            dir: asset_dir.to_path_buf(),
            current_name: "new.jpg".to_string(),
            previous_name: "old.jpg".to_string(),
        },
        skybox: SkyboxConfig {
            api_key: "test-key".to_string(),
            endpoint: format!("{UNREACHABLE}/api/v1/skybox"),
            style_id: 35,
            public_base_url: Some("https://gateway.test".to_string()),
            ngrok_api_url: None,
        },
        sd: SdConfig {
            api_url: UNREACHABLE.to_string(),
            output_dir: asset_dir.join("sd_outputs"),
        },
        agent_url: UNREACHABLE.to_string(),
        max_upload_bytes: interio_http::DEFAULT_MAX_UPLOAD_BYTES,
    }
}

/// Application under test: the router plus handles into its state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Build the full application router with all middleware layers.
///
/// Mirrors `main.rs` so integration tests exercise the same middleware
/// stack production uses. No background tasks are started.
pub fn build_test_app(config: ServerConfig) -> TestApp {
    let webhook_url = config
        .skybox
        .public_base_url
        .as_deref()
        .map(interio_api::config::webhook_url_for);
    let fetcher = AssetFetcher::new(Duration::from_secs(5)).unwrap();
    let state = AppState::new(config.clone(), reqwest::Client::new(), fetcher, webhook_url);
    let router = build_app_router(state.clone(), &config);
    TestApp { router, state }
}

/// Serve the app on an ephemeral port with the notification relay running.
///
/// Returns the `host:port` address and the state.
pub async fn spawn_app(config: ServerConfig) -> (String, AppState) {
    let app = build_test_app(config);
    let relay = NotificationRelay::new(Arc::clone(&app.state.ws_manager));
    tokio::spawn(relay.run(app.state.event_bus.subscribe()));

    let addr = spawn_router(app.router).await;
    (addr, app.state)
}

/// Serve a router (fake upstream or app) on `127.0.0.1:0`; returns `host:port`.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

/// Serve a fake upstream and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    format!("http://{}", spawn_router(router).await)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<axum::body::Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<axum::body::Body> {
    post_raw(app, uri, "application/json", body.to_string()).await
}

pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: &str,
    body: impl Into<Body>,
) -> Response<axum::body::Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Asset helpers
// ---------------------------------------------------------------------------

pub fn seed_current(dir: &Path, bytes: &[u8]) {
    std::fs::write(dir.join("new.jpg"), bytes).unwrap();
}

pub fn read_slot(dir: &Path, name: &str) -> Option<Vec<u8>> {
    std::fs::read(dir.join(name)).ok()
}
