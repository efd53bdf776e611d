//! Stable Diffusion WebUI (`/sdapi/v1`) client.

#[derive(Debug, thiserror::Error)]
pub enum SdError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The WebUI answered with a non-200 status.
    #[error("Stable Diffusion returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid JSON from Stable Diffusion: {0}")]
    InvalidJson(String),
}

pub struct SdClient {
    client: reqwest::Client,
    base_url: String,
}

impl SdClient {
    /// * `base_url` - WebUI root, e.g. `http://sd-host:7860`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run `txt2img` with a caller-supplied payload, passed through verbatim.
    pub async fn txt2img(&self, payload: &serde_json::Value) -> Result<serde_json::Value, SdError> {
        let response = self
            .client
            .post(format!("{}/sdapi/v1/txt2img", self.base_url))
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SdError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SdError::InvalidJson(e.to_string()))
    }
}

/// First base64 image of a `txt2img` response, if any.
pub fn first_image(response: &serde_json::Value) -> Option<&str> {
    response
        .get("images")?
        .as_array()?
        .first()?
        .as_str()
        .filter(|s| !s.is_empty())
}
