use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use interio_core::media;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::prompts;
use crate::service::{CatalogItem, ChatReply};
use crate::state::AppState;

const INVALID_INPUT: &str = "Invalid input";
const NO_INPUT: &str = "No message or image provided";

#[derive(Debug, Default, Deserialize)]
struct ChatJson {
    #[serde(default)]
    message: Option<String>,
}

/// An uploaded image: original file name and bytes.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// POST /api/chat/
///
/// Multipart (`message`, optional `image`) or JSON `{message}`; both end up
/// as one turn on the shared session.
pub async fn chat(State(state): State<AppState>, request: Request) -> AppResult<Json<ChatReply>> {
    let (message, image) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| invalid_input(rejection.status()))?;
        read_chat_form(multipart).await?
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|rejection| invalid_input(rejection.status()))?;
        let input: ChatJson = serde_json::from_slice(&body)
            .map_err(|_| AppError::BadRequest(INVALID_INPUT.into()))?;
        (input.message.unwrap_or_default(), None)
    };

    let image_url = image
        .map(|upload| media::data_url_for_file(&upload.file_name, &upload.bytes))
        .transpose()?;

    let message = prompts::chat_message(image_url, message.trim())
        .ok_or_else(|| AppError::BadRequest(NO_INPUT.into()))?;

    let reply = state.agent.chat(message).await?;
    tracing::info!(session_id = %reply.session_id, "Chat turn completed");
    Ok(Json(reply))
}

/// Over-limit bodies stay 413; every other extraction failure is a 400.
fn invalid_input(status: StatusCode) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(INVALID_INPUT.into())
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn read_chat_form(mut multipart: Multipart) -> AppResult<(String, Option<Upload>)> {
    let invalid = |e: MultipartError| invalid_input(e.status());
    let mut message = String::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => message = field.text().await.map_err(invalid)?,
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                if !bytes.is_empty() {
                    image = Some(Upload { file_name, bytes });
                }
            }
            _ => {}
        }
    }
    Ok((message, image))
}

#[derive(Debug, Default, Deserialize)]
pub struct RetrieveImagesRequest {
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/retrieve_images/
pub async fn retrieve_images(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let input: RetrieveImagesRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON".into()))?;
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("No description provided".into()))?;

    let items = state.agent.retrieve_images(description).await?;
    tracing::info!(description, matches = items.len(), "Catalog retrieval completed");
    Ok(Json(items))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub agent_id: String,
    /// Whether the shared chat session has been created.
    pub session_active: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        agent_id: state.agent.agent_id().to_string(),
        session_active: state.agent.session_id().is_some(),
    })
}
