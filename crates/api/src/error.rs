use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use interio_core::error::CoreError;
use interio_providers::blockade::BlockadeError;
use interio_providers::stable_diffusion::SdError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Internal details are logged, never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `interio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An external service failed. `message` is safe to show; `detail` is
    /// only logged.
    #[error("Upstream error ({status}): {message}: {detail}")]
    Upstream {
        status: StatusCode,
        message: String,
        detail: String,
    },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn upstream(status: StatusCode, message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<BlockadeError> for AppError {
    fn from(err: BlockadeError) -> Self {
        match err {
            BlockadeError::InvalidJson { status, body } => AppError::upstream(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid JSON response from Blockade Labs API",
                format!("HTTP {status}: {body}"),
            ),
            BlockadeError::Request(e) => AppError::upstream(
                StatusCode::BAD_GATEWAY,
                "Skybox service unreachable",
                e,
            ),
        }
    }
}

impl From<SdError> for AppError {
    fn from(err: SdError) -> Self {
        match err {
            SdError::HttpStatus(code) => AppError::upstream(
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
                "Failed to generate image",
                format!("Stable Diffusion returned HTTP {code}"),
            ),
            other => AppError::upstream(
                StatusCode::BAD_GATEWAY,
                "Stable Diffusion service unavailable",
                other,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::UnsupportedMedia(msg) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_MEDIA",
                    msg.clone(),
                ),
                CoreError::Io(err) => {
                    tracing::error!(error = %err, "I/O error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Upstream {
                status,
                message,
                detail,
            } => {
                tracing::warn!(status = %status, error = %detail, "{message}");
                (*status, "UPSTREAM_ERROR", message.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
