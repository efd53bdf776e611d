//! Blockade Labs Skybox API client.
//!
//! Submits image-conditioned ("remix") skybox generations. The result is
//! not awaited here: Blockade Labs calls our webhook as the job moves
//! through `dispatched`, `processing` and `complete`.

use serde::Serialize;

/// Skybox style used by the Unity scene.
pub const DEFAULT_STYLE_ID: i64 = 35;

/// Control model that keeps the layout of the control image.
pub const CONTROL_MODEL_REMIX: &str = "remix";

/// Prompt used when the caller sends none.
pub const DEFAULT_PROMPT: &str = "A beautiful futuristic bedroom";

/// Body of a skybox generation request.
#[derive(Debug, Clone, Serialize)]
pub struct SkyboxRequest {
    pub skybox_style_id: i64,
    pub prompt: String,
    /// Base64-encoded control image (no data URL prefix).
    pub control_image: String,
    pub control_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl SkyboxRequest {
    pub fn remix(
        style_id: i64,
        prompt: impl Into<String>,
        control_image: impl Into<String>,
        webhook_url: Option<String>,
    ) -> Self {
        Self {
            skybox_style_id: style_id,
            prompt: prompt.into(),
            control_image: control_image.into(),
            control_model: CONTROL_MODEL_REMIX.to_string(),
            webhook_url,
        }
    }
}

/// Raw answer from Blockade Labs, relayed to our caller unchanged.
#[derive(Debug, Clone)]
pub struct BlockadeResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum BlockadeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a body that is not JSON.
    #[error("Invalid JSON response from Blockade Labs API (HTTP {status})")]
    InvalidJson { status: u16, body: String },
}

pub struct BlockadeClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl BlockadeClient {
    /// * `endpoint` - Full generation URL, e.g.
    ///   `https://backend.blockadelabs.com/api/v1/skybox`.
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    pub async fn generate(&self, request: &SkyboxRequest) -> Result<BlockadeResponse, BlockadeError> {
        tracing::info!(
            prompt = %request.prompt,
            style_id = request.skybox_style_id,
            webhook_url = request.webhook_url.as_deref().unwrap_or("<none>"),
            "Submitting skybox generation"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!(status, "Blockade Labs responded");

        match serde_json::from_str(&text) {
            Ok(body) => Ok(BlockadeResponse { status, body }),
            Err(_) => Err(BlockadeError::InvalidJson { status, body: text }),
        }
    }
}
