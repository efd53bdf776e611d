//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the production binary (`main.rs`)
//! and integration tests (`tests/common/mod.rs`) use the exact same middleware
//! stack.

use std::time::Duration;

use axum::Router;
use interio_http::HttpSettings;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Build the full gateway [`Router`]: health, the skybox WebSocket, the
/// static material directory and the `/api` tree, wrapped in the common
/// middleware stack (see [`interio_http::with_middleware`]).
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::ws_routes())
        .merge(routes::material_routes(&config.assets.dir))
        .nest("/api", routes::api_routes(config.max_upload_bytes));

    interio_http::with_middleware(routes, &http_settings(config)).with_state(state)
}

/// The Unity viewer and web client send credentials, so the gateway allows them.
pub fn http_settings(config: &ServerConfig) -> HttpSettings {
    HttpSettings {
        cors_origins: config.cors_origins.clone(),
        allow_credentials: true,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    }
}
