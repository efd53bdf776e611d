use std::path::PathBuf;
use std::str::FromStr;

use interio_core::assets::{DEFAULT_CURRENT_NAME, DEFAULT_PREVIOUS_NAME};
use interio_providers::blockade::DEFAULT_STYLE_ID;
use interio_providers::tunnel::{TunnelDiscovery, TunnelError};

/// Path the generator calls back on, relative to the public base URL.
pub const WEBHOOK_PATH: &str = "/api/pano-gen/webhook/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    pub assets: AssetConfig,
    pub skybox: SkyboxConfig,
    pub sd: SdConfig,
    /// Base URL of the agent service the `/api/llama_gateway` routes forward to.
    pub agent_url: String,
    /// Body cap for the agent proxy (default: 20 MiB).
    pub max_upload_bytes: usize,
}

/// Where the current / previous skybox live.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub current_name: String,
    pub previous_name: String,
}

#[derive(Debug, Clone)]
pub struct SkyboxConfig {
    pub api_key: String,
    pub endpoint: String,
    pub style_id: i64,
    /// Externally reachable base URL of this gateway, if known up front.
    pub public_base_url: Option<String>,
    /// ngrok agent API used to discover the base URL when it is not set.
    pub ngrok_api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SdConfig {
    pub api_url: String,
    pub output_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                       |
    /// |--------------------------|-------------------------------|
    /// | `HOST`                   | `0.0.0.0`                     |
    /// | `PORT`                   | `8000`                        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`   | `120`                         |
    /// | `ASSET_DIR`              | `/app/Material`               |
    /// | `ASSET_CURRENT_NAME`     | `new.jpg`                     |
    /// | `ASSET_PREVIOUS_NAME`    | `old.jpg`                     |
    /// | `BLOCKADE_LABS_API_KEY`  | required                      |
    /// | `BLOCKADE_LABS_ENDPOINT` | required                      |
    /// | `SKYBOX_STYLE_ID`        | `35`                          |
    /// | `PUBLIC_BASE_URL`        | unset                         |
    /// | `NGROK_API_URL`          | unset                         |
    /// | `SD_API_URL`             | `http://localhost:7860`       |
    /// | `SD_OUTPUT_DIR`          | `sd_outputs`                  |
    /// | `AGENT_URL`              | `http://ida-llama-agent:8001` |
    /// | `MAX_UPLOAD_BYTES`       | `20971520` (20 MiB)           |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8000)?,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 120)?,
            assets: AssetConfig {
                dir: PathBuf::from(env_or("ASSET_DIR", "/app/Material")),
                current_name: env_or("ASSET_CURRENT_NAME", DEFAULT_CURRENT_NAME),
                previous_name: env_or("ASSET_PREVIOUS_NAME", DEFAULT_PREVIOUS_NAME),
            },
            skybox: SkyboxConfig {
                api_key: env_required("BLOCKADE_LABS_API_KEY")?,
                endpoint: env_required("BLOCKADE_LABS_ENDPOINT")?,
                style_id: env_parse("SKYBOX_STYLE_ID", DEFAULT_STYLE_ID)?,
                public_base_url: env_optional("PUBLIC_BASE_URL"),
                ngrok_api_url: env_optional("NGROK_API_URL"),
            },
            sd: SdConfig {
                api_url: env_or("SD_API_URL", "http://localhost:7860"),
                output_dir: PathBuf::from(env_or("SD_OUTPUT_DIR", "sd_outputs")),
            },
            agent_url: env_or("AGENT_URL", "http://ida-llama-agent:8001")
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", interio_http::DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

impl SkyboxConfig {
    /// Work out the webhook URL handed to the generator.
    ///
    /// An explicit `PUBLIC_BASE_URL` wins. Otherwise, if `NGROK_API_URL` is
    /// set, the tunnel is discovered now and a failure is returned to the
    /// caller. With neither, generation runs without a webhook.
    pub async fn resolve_webhook_url(
        &self,
        client: &reqwest::Client,
    ) -> Result<Option<String>, TunnelError> {
        if let Some(base) = &self.public_base_url {
            return Ok(Some(webhook_url_for(base)));
        }
        match &self.ngrok_api_url {
            Some(api_url) => {
                let base = TunnelDiscovery::new(client.clone(), api_url.clone())
                    .discover()
                    .await?;
                Ok(Some(webhook_url_for(&base)))
            }
            None => Ok(None),
        }
    }
}

pub fn webhook_url_for(base: &str) -> String {
    format!("{}{WEBHOOK_PATH}", base.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Env helpers
// ---------------------------------------------------------------------------

fn env_optional(var: &'static str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(var: &'static str, default: &str) -> String {
    env_optional(var).unwrap_or_else(|| default.to_string())
}

fn env_required(var: &'static str) -> Result<String, ConfigError> {
    env_optional(var).ok_or(ConfigError::Missing(var))
}

fn env_parse<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env_optional(var) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
