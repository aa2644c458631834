//! Remote retrieval of the verification key text.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Key retrieval errors.
///
/// None of these are cached: the provider retries the fetch on the next call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("key request failed: {0}")]
    Request(String),
    #[error("key source returned status {0}")]
    Status(u16),
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

/// Source of raw key text (PEM).
///
/// Implementations perform one retrieval per call; caching lives in
/// `CachedKeyProvider`.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    // Where the key comes from (for logging).
    fn source(&self) -> &str;

    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the public key with a plain GET and returns the body as text.
#[derive(Debug, Clone)]
pub struct HttpKeyFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeyFetcher {
    /// `timeout` bounds the whole request (connect + body).
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    fn source(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}
