use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Agent routes.
///
/// ```text
/// GET  /health                 -> health_check
/// POST /api/chat/              -> chat
/// POST /api/retrieve_images/   -> retrieve_images
/// ```
///
/// `/api/chat/` takes photo uploads up to `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/chat/",
            post(handlers::chat).layer(interio_http::upload_limit(max_upload_bytes)),
        )
        .route("/api/retrieve_images/", post(handlers::retrieve_images))
}
