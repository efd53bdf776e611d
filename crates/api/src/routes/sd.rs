use axum::routing::post;
use axum::Router;

use crate::handlers::sd;
use crate::state::AppState;

/// Stable Diffusion routes mounted at `/sd`.
pub fn router() -> Router<AppState> {
    Router::new().route("/txt2img", post(sd::txt2img))
}
