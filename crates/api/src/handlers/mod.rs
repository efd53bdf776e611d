pub mod llama_gateway;
pub mod pano_gen;
pub mod sd;

use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Decode a JSON request body, answering 400 with `invalid_msg` on failure.
///
/// Handlers take the raw body instead of `Json<T>` so malformed input gets
/// the same `{"error": ...}` shape as every other failure.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8], invalid_msg: &str) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::BadRequest(invalid_msg.to_string())
    })
}
