//! Pass-through proxy to the agent service.
//!
//! The browser talks to this gateway only; every `llama_gateway` call is
//! forwarded to `<AGENT_URL>/api/<endpoint>/` with its body and
//! `content-type` untouched, so multipart uploads survive the hop.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use interio_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Endpoints exposed by the agent service.
pub const AGENT_ENDPOINTS: &[&str] = &["chat", "list_items", "suggest_alternatives", "retrieve_images"];

/// Upper bound on a single agent call. LLM turns are slow.
pub const AGENT_TIMEOUT: Duration = Duration::from_secs(60);

/// POST /api/llama_gateway/{endpoint}/
pub async fn forward(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if !AGENT_ENDPOINTS.contains(&endpoint.as_str()) {
        return Err(CoreError::NotFound(format!("Unknown agent endpoint '{endpoint}'")).into());
    }

    let url = format!("{}/api/{endpoint}/", state.config.agent_url);
    let mut request = state.http.post(&url).timeout(AGENT_TIMEOUT).body(body);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }

    let response = request.send().await.map_err(|e| {
        AppError::upstream(StatusCode::BAD_GATEWAY, "Agent service unreachable", e)
    })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let text = response.text().await.map_err(|e| {
        AppError::upstream(StatusCode::BAD_GATEWAY, "Agent service unreachable", e)
    })?;

    tracing::debug!(endpoint, status = status.as_u16(), "Agent call forwarded");

    let payload = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    Ok((status, Json(payload)))
}
