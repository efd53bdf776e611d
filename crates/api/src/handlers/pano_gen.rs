//! Panorama (skybox) generation handlers.
//!
//! `generate_with_image` submits a remix of the current skybox to Blockade
//! Labs; `skybox_webhook` receives the job callbacks, swaps the finished
//! panorama into place and tells connected viewers to reload.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use interio_core::assets::SwapOutcome;
use interio_core::error::CoreError;
use interio_core::media;
use interio_core::skybox::{
    acknowledge_message, WebhookAction, WebhookPayload, MSG_DOWNLOAD_FAILED, MSG_UPDATED,
};
use interio_events::RealtimeEvent;
use interio_providers::blockade::{SkyboxRequest, DEFAULT_PROMPT};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::parse_json;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GenerateWithImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// POST /api/pano-gen/generate_with_image/
///
/// Remix the current skybox with a new prompt. The Blockade Labs answer is
/// relayed as-is; the finished image arrives later through the webhook.
pub async fn generate_with_image(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: GenerateWithImageRequest = parse_json(&body, "Invalid JSON format")?;
    let prompt = input
        .prompt
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let control_image = state.assets.read_current().await.map_err(|e| match e {
        CoreError::NotFound(msg) => AppError::BadRequest(msg),
        other => AppError::Core(other),
    })?;

    let request = SkyboxRequest::remix(
        state.config.skybox.style_id,
        prompt,
        media::encode_base64(&control_image),
        state.webhook_url.clone(),
    );
    let response = state.blockade.generate(&request).await?;

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(response.body)))
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// POST /api/pano-gen/webhook/
///
/// | status                      | effect                          | reply |
/// |-----------------------------|---------------------------------|-------|
/// | `dispatched` / `processing` | none                            | 202   |
/// | `complete` + `file_url`     | download, swap, notify viewers  | 200   |
/// | `complete`, no `file_url`   | none                            | 400   |
/// | anything else               | none                            | 400   |
///
/// Safe to replay: a repeated `complete` simply downloads and swaps again.
pub async fn skybox_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let payload: WebhookPayload = parse_json(&body, "Invalid JSON body")?;

    tracing::info!(
        status = %payload.status,
        job_id = ?payload.id,
        file_url = payload.file_url.as_deref().unwrap_or_default(),
        "Skybox webhook received"
    );
    if let Some(error_message) = &payload.error_message {
        tracing::warn!(status = %payload.status, %error_message, "Generator reported an error");
    }

    match payload.action()? {
        WebhookAction::Acknowledge(status) => Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse::new(acknowledge_message(&status))),
        )),
        WebhookAction::Fetch { file_url } => {
            let outcome = update_skybox(&state, &file_url).await?;
            tracing::info!(
                file_url,
                bytes = outcome.bytes_written,
                rotated = outcome.rotated,
                "Skybox updated"
            );
            Ok((StatusCode::OK, Json(MessageResponse::new(MSG_UPDATED))))
        }
    }
}

/// Download, swap and notify, in that order.
///
/// Nothing on disk changes unless the download succeeded and produced an
/// image; viewers are only notified after the swap.
async fn update_skybox(state: &AppState, file_url: &str) -> AppResult<SwapOutcome> {
    let bytes = state
        .fetcher
        .fetch(file_url)
        .await
        .map_err(|e| AppError::upstream(StatusCode::INTERNAL_SERVER_ERROR, MSG_DOWNLOAD_FAILED, e))?;

    let outcome = state.assets.swap(&bytes).await.map_err(|e| match e {
        CoreError::UnsupportedMedia(detail) => {
            AppError::upstream(StatusCode::INTERNAL_SERVER_ERROR, MSG_DOWNLOAD_FAILED, detail)
        }
        other => AppError::Core(other),
    })?;

    let subscribers = state.event_bus.publish(RealtimeEvent::skybox_updated());
    tracing::debug!(subscribers, "Published skybox update");

    Ok(outcome)
}
