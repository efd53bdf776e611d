//! Skybox generation job status and webhook dispatch.
//!
//! The generator reports job progress by calling our webhook. No job record
//! is kept locally: each call is classified on its own into a
//! [`WebhookAction`] and then forgotten.

use std::fmt;

use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Job accepted by the generator, not started yet.
pub const STATUS_DISPATCHED: &str = "dispatched";
/// Job is rendering.
pub const STATUS_PROCESSING: &str = "processing";
/// Job finished; `file_url` points at the result.
pub const STATUS_COMPLETE: &str = "complete";

/// Response message after a successful swap.
pub const MSG_UPDATED: &str = "Skybox updated successfully";
/// Response message when the finished asset could not be retrieved.
pub const MSG_DOWNLOAD_FAILED: &str = "Failed to download new skybox";
/// Response message when a `complete` callback carries no file URL.
pub const MSG_MISSING_FILE_URL: &str = "No file URL received";

// ---------------------------------------------------------------------------
// GenerationStatus
// ---------------------------------------------------------------------------

/// Status value reported by the external generator.
///
/// Anything outside the three known values is preserved verbatim in
/// [`GenerationStatus::Other`] so it can be echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Dispatched,
    Processing,
    Complete,
    Other(String),
}

impl GenerationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            STATUS_DISPATCHED => Self::Dispatched,
            STATUS_PROCESSING => Self::Processing,
            STATUS_COMPLETE => Self::Complete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Dispatched => STATUS_DISPATCHED,
            Self::Processing => STATUS_PROCESSING,
            Self::Complete => STATUS_COMPLETE,
            Self::Other(s) => s,
        }
    }

    /// Whether the job is still running on the generator side.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Dispatched | Self::Processing)
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Webhook payload
// ---------------------------------------------------------------------------

/// JSON body posted by the generator to the webhook endpoint.
///
/// Only `status` is required. `id` and `error_message` are carried by the
/// Blockade Labs callback and are used for logging only.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub status: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// What the webhook handler must do for a given payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// Job still in flight: acknowledge with 202, touch nothing.
    Acknowledge(GenerationStatus),
    /// Job finished: retrieve the asset, swap it in and notify.
    Fetch { file_url: String },
}

impl WebhookPayload {
    pub fn status(&self) -> GenerationStatus {
        GenerationStatus::parse(&self.status)
    }

    /// Classify the payload.
    ///
    /// Fails with [`CoreError::Validation`] when a `complete` payload has no
    /// usable `file_url`, or when the status is not one we know.
    pub fn action(&self) -> Result<WebhookAction, CoreError> {
        match self.status() {
            status if status.is_in_progress() => Ok(WebhookAction::Acknowledge(status)),
            GenerationStatus::Complete => {
                let file_url = self
                    .file_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| CoreError::Validation(MSG_MISSING_FILE_URL.to_string()))?;
                Ok(WebhookAction::Fetch {
                    file_url: file_url.to_string(),
                })
            }
            other => Err(CoreError::Validation(format!(
                "Unexpected skybox status: {other}"
            ))),
        }
    }
}

/// Message echoed back for an in-progress status.
pub fn acknowledge_message(status: &GenerationStatus) -> String {
    format!("Skybox status: {status}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
