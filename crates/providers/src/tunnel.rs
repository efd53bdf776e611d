//! ngrok tunnel discovery.
//!
//! In local development the generator cannot reach `localhost`, so the
//! gateway runs behind an ngrok tunnel and asks the ngrok agent API for the
//! public `https` URL once at startup.

use std::time::Duration;

use serde::Deserialize;

/// Attempts before giving up (10 x 3 s = 30 s).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Deserialize)]
pub struct Tunnel {
    pub proto: String,
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<Tunnel>,
}

#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("No https tunnel found at {api_url} after {attempts} attempts")]
    NotFound { api_url: String, attempts: u32 },
}

pub struct TunnelDiscovery {
    client: reqwest::Client,
    api_url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl TunnelDiscovery {
    /// * `api_url` - ngrok agent API root, e.g. `http://ngrok:4040`.
    pub fn new(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Poll the ngrok API until it lists an `https` tunnel.
    pub async fn discover(&self) -> Result<String, TunnelError> {
        let url = format!("{}/api/tunnels", self.api_url);

        for attempt in 1..=self.max_attempts {
            match self.list(&url).await {
                Ok(tunnels) => {
                    if let Some(public_url) = pick_https(&tunnels) {
                        tracing::info!(%public_url, attempt, "Resolved ngrok tunnel");
                        return Ok(public_url);
                    }
                    tracing::debug!(attempt, "ngrok is up but has no https tunnel yet");
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "ngrok API not reachable yet");
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(TunnelError::NotFound {
            api_url: self.api_url.clone(),
            attempts: self.max_attempts,
        })
    }

    async fn list(&self, url: &str) -> Result<Vec<Tunnel>, reqwest::Error> {
        let list: TunnelList = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(list.tunnels)
    }
}

pub fn pick_https(tunnels: &[Tunnel]) -> Option<String> {
    tunnels
        .iter()
        .find(|t| t.proto == "https")
        .map(|t| t.public_url.trim_end_matches('/').to_string())
}
