//! Router builder shared by `main.rs` and the integration tests.

use std::time::Duration;

use axum::Router;
use interio_http::HttpSettings;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let settings = HttpSettings {
        cors_origins: config.cors_origins.clone(),
        allow_credentials: false,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    };
    interio_http::with_middleware(routes::router(config.max_upload_bytes), &settings)
        .with_state(state)
}
