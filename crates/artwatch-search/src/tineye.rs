// crates/artwatch-search/src/tineye.rs
//
// TinEye REST search backend.
//
// GET {endpoint}?image_url={image_url}&api_key={key}

use async_trait::async_trait;
use serde::Deserialize;

use artwatch_core::{ArtwatchError, Candidate, SearchBackend};

use crate::{check_status, non_empty, public_image_url};

pub const TINEYE_ENDPOINT: &str = "https://api.tineye.com/rest/search/";

#[derive(Debug, Deserialize)]
struct TinEyeResponse {
    #[serde(default)]
    matches: Vec<TinEyeMatch>,
}

#[derive(Debug, Deserialize)]
struct TinEyeMatch {
    image_url: String,
    #[serde(default)]
    domain: Option<String>,
}

/// TinEye backend. The match's domain is used as the candidate title.
#[derive(Debug, Clone)]
pub struct TinEyeBackend {
    api_key: Option<String>,
    gateway_base: String,
    endpoint: String,
    client: reqwest::Client,
}

impl TinEyeBackend {
    pub fn new(api_key: Option<String>, gateway_base: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: non_empty(api_key),
            gateway_base: gateway_base.to_string(),
            endpoint: TINEYE_ENDPOINT.to_string(),
            client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for TinEyeBackend {
    fn name(&self) -> &str {
        "tineye"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError> {
        let Some(key) = &self.api_key else {
            return Err(ArtwatchError::Configuration(
                "TinEye API key not configured".to_string(),
            ));
        };
        let image_url = public_image_url(&self.gateway_base, content_ref);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("image_url", image_url.as_str()), ("api_key", key.as_str())])
            .send()
            .await
            .map_err(|e| ArtwatchError::Network(format!("TinEye request failed: {}", e)))?;

        check_status("TinEye", &response)?;

        let body: TinEyeResponse = response
            .json()
            .await
            .map_err(|e| ArtwatchError::Serialization(format!("TinEye response parse failed: {}", e)))?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| Candidate::new(m.image_url, m.domain))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_json_server;

    #[tokio::test]
    async fn parses_matches_with_domain_as_title() {
        let body = r#"{"matches":[{"image_url":"https://x.example/copy.png","domain":"x.example"}]}"#;
        let (base_url, request) = mock_json_server(200, body).await;
        let backend = TinEyeBackend::new(Some("tk".into()), "https://gw/ipfs", reqwest::Client::new())
            .with_endpoint(&format!("{}/rest/search/", base_url));

        let candidates = backend.search("QmArt").await.unwrap();
        assert_eq!(
            candidates,
            vec![Candidate::new("https://x.example/copy.png", Some("x.example".into()))]
        );

        let raw = request.await.unwrap();
        assert!(raw.contains("api_key=tk"));
        assert!(raw.contains("image_url="));
    }

    #[tokio::test]
    async fn malformed_payload_is_serialization_error() {
        let (base_url, _request) = mock_json_server(200, "not json").await;
        let backend = TinEyeBackend::new(Some("tk".into()), "https://gw", reqwest::Client::new())
            .with_endpoint(&base_url);
        assert!(matches!(
            backend.search("QmArt").await,
            Err(ArtwatchError::Serialization(_))
        ));
    }

    #[test]
    fn blank_key_disables_backend() {
        let backend = TinEyeBackend::new(Some(String::new()), "https://gw", reqwest::Client::new());
        assert!(!backend.is_enabled());
    }
}
