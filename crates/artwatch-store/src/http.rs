// crates/artwatch-store/src/http.rs
//
// Direct HTTP image fetcher. Used for candidate URLs returned by search
// backends, and as the transport under the gateway fetcher.

use std::time::Duration;

use async_trait::async_trait;

use artwatch_core::{ArtwatchError, ImageFetcher};

/// Default per-request timeout for image downloads.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest image body accepted by default (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Fetches image bytes from an absolute URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ArtwatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArtwatchError::Configuration(format!("HTTP client build failed: {}", e)))?;
        Ok(Self::with_client(client))
    }

    /// Create a fetcher sharing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Reject bodies larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// GET `url` and return the body bytes.
    ///
    /// Non-2xx and bodies over `max_bytes` are `Network` errors. The body is
    /// read chunk by chunk so an oversized response is abandoned early.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ArtwatchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArtwatchError::Network(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ArtwatchError::Network(format!(
                "GET {} returned status {}",
                url,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(self.too_large(url));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ArtwatchError::Network(format!("GET {} body read failed: {}", url, e)))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn too_large(&self, url: &str) -> ArtwatchError {
        ArtwatchError::Network(format!(
            "GET {} response exceeds {} bytes",
            url, self.max_bytes
        ))
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ArtwatchError> {
        self.get_bytes(reference).await
    }
}
