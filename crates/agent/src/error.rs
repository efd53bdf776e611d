use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use interio_core::error::CoreError;
use interio_providers::llama_stack::LlamaStackError;
use serde_json::json;

/// Failures of the agent service itself.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    LlamaStack(#[from] LlamaStackError),

    #[error("No documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model answered, but not with the JSON we asked for.
    #[error("Unparseable agent reply: {0}")]
    InvalidReply(String),
}

/// Application-level error type for HTTP handlers.
///
/// Every failure is logged in full; responses carry a fixed message only.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload exceeds the configured body limit")]
    PayloadTooLarge,
}

pub type AppResult<T> = Result<T, AppError>;

impl From<LlamaStackError> for AppError {
    fn from(err: LlamaStackError) -> Self {
        AppError::Agent(AgentError::LlamaStack(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload is too large".to_string(),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::UnsupportedMedia(msg)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA",
                msg.clone(),
            ),
            AppError::Core(CoreError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::Agent(AgentError::InvalidReply(detail)) => {
                tracing::warn!(error = %detail, "Agent reply was not valid JSON");
                (
                    StatusCode::BAD_GATEWAY,
                    "INVALID_AGENT_REPLY",
                    "Agent returned an unparseable reply".to_string(),
                )
            }
            AppError::Agent(AgentError::LlamaStack(err)) => {
                tracing::error!(error = %err, "Agent turn failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AGENT_ERROR",
                    "The agent could not complete the request".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}
