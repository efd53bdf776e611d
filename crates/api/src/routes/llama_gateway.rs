use axum::routing::post;
use axum::Router;

use crate::handlers::llama_gateway;
use crate::state::AppState;

/// Agent proxy routes mounted at `/llama_gateway`.
///
/// ```text
/// POST /{endpoint}/   -> forward (chat, list_items, suggest_alternatives, retrieve_images)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{endpoint}/", post(llama_gateway::forward))
}
