use axum::routing::post;
use axum::Router;

use crate::handlers::pano_gen;
use crate::state::AppState;

/// Skybox generation routes mounted at `/pano-gen`.
///
/// ```text
/// POST /webhook/               -> skybox_webhook
/// POST /generate_with_image/   -> generate_with_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook/", post(pano_gen::skybox_webhook))
        .route("/generate_with_image/", post(pano_gen::generate_with_image))
}
