pub mod health;
pub mod llama_gateway;
pub mod pano_gen;
pub mod sd;

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pano-gen/webhook/                   generator callback (POST)
/// /pano-gen/generate_with_image/       remix current skybox (POST)
///
/// /sd/txt2img                          Stable Diffusion txt2img (POST)
///
/// /llama_gateway/{endpoint}/           agent service proxy (POST)
/// ```
///
/// The agent proxy carries chat photo uploads, so it accepts bodies up to
/// `max_upload_bytes` instead of axum's 2 MB default.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/pano-gen", pano_gen::router())
        .nest("/sd", sd::router())
        .nest(
            "/llama_gateway",
            llama_gateway::router().layer(interio_http::upload_limit(max_upload_bytes)),
        )
}

/// WebSocket endpoints, mounted at the root.
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/skybox-updates/", get(ws::skybox_updates_handler))
}

/// Static skybox files for the Unity viewer (`/material/new.jpg`).
pub fn material_routes(asset_dir: &Path) -> Router<AppState> {
    Router::new().nest_service("/material", ServeDir::new(asset_dir))
}
