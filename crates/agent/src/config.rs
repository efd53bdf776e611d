use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Agent service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Root of the LlamaStack distribution.
    pub llama_stack_url: String,
    /// Model every agent is created with.
    pub model: String,
    /// Catalog documents indexed into the vector DB at startup.
    pub document_dir: PathBuf,
    /// Body cap for `/api/chat/` uploads.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `8001`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                   |
    /// | `LLAMA_STACK_URL`      | `http://localhost:5000` |
    /// | `LLAMA_MODEL`          | required                |
    /// | `DOCUMENT_DIR`         | `resources/documents`   |
    /// | `MAX_UPLOAD_BYTES`     | `20971520` (20 MiB)     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8001)?,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 120)?,
            llama_stack_url: env_or("LLAMA_STACK_URL", "http://localhost:5000"),
            model: env_required("LLAMA_MODEL")?,
            document_dir: PathBuf::from(env_or("DOCUMENT_DIR", "resources/documents")),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", interio_http::DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

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
