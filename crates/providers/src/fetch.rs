//! Download finished assets from the generator's CDN.

use std::time::Duration;

/// Default timeout for a single asset download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("Asset download returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Asset download returned an empty body")]
    Empty,
}

/// Retrieves asset bytes over HTTP.
#[derive(Clone)]
pub struct AssetFetcher {
    client: reqwest::Client,
}

impl AssetFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Download `url` and return its body.
    ///
    /// Only a `200 OK` with a non-empty body counts as a confirmed
    /// retrieval.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        tracing::debug!(url, bytes = bytes.len(), "Asset downloaded");
        Ok(bytes.to_vec())
    }
}
