// crates/artwatch-search/src/google.rs
//
// Google Custom Search (image search) backend.
// Enabled only when both an API key and a search engine id (cx) are set.
//
// GET {endpoint}?q={image_url}&searchType=image&key={key}&cx={cx}

use async_trait::async_trait;
use serde::Deserialize;

use artwatch_core::{ArtwatchError, Candidate, SearchBackend};

use crate::{check_status, non_empty, public_image_url};

pub const GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    link: String,
    #[serde(default)]
    title: Option<String>,
}

/// Google Custom Search backend.
#[derive(Debug, Clone)]
pub struct GoogleBackend {
    api_key: Option<String>,
    cx: Option<String>,
    gateway_base: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleBackend {
    pub fn new(
        api_key: Option<String>,
        cx: Option<String>,
        gateway_base: &str,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: non_empty(api_key),
            cx: non_empty(cx),
            gateway_base: gateway_base.to_string(),
            endpoint: GOOGLE_ENDPOINT.to_string(),
            client,
        }
    }

    /// Point the backend at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for GoogleBackend {
    fn name(&self) -> &str {
        "google"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some() && self.cx.is_some()
    }

    async fn search(&self, content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError> {
        let (Some(key), Some(cx)) = (&self.api_key, &self.cx) else {
            return Err(ArtwatchError::Configuration(
                "Google API credentials not configured".to_string(),
            ));
        };
        let image_url = public_image_url(&self.gateway_base, content_ref);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", image_url.as_str()),
                ("searchType", "image"),
                ("key", key.as_str()),
                ("cx", cx.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ArtwatchError::Network(format!("Google request failed: {}", e)))?;

        check_status("Google", &response)?;

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| ArtwatchError::Serialization(format!("Google response parse failed: {}", e)))?;

        Ok(body
            .items
            .into_iter()
            .map(|item| Candidate::new(item.link, item.title))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_json_server;

    #[test]
    fn requires_both_credentials() {
        let client = reqwest::Client::new();
        assert!(!GoogleBackend::new(Some("k".into()), None, "https://gw", client.clone()).is_enabled());
        assert!(!GoogleBackend::new(None, Some("cx".into()), "https://gw", client.clone()).is_enabled());
        assert!(GoogleBackend::new(Some("k".into()), Some("cx".into()), "https://gw", client).is_enabled());
    }

    #[tokio::test]
    async fn parses_items() {
        let body = r#"{"items":[{"link":"https://a.example/1.png","title":"One"},{"link":"https://b.example/2.jpg"}]}"#;
        let (base_url, request) = mock_json_server(200, body).await;
        let backend = GoogleBackend::new(
            Some("key123".into()),
            Some("cx456".into()),
            "https://gw/ipfs",
            reqwest::Client::new(),
        )
        .with_endpoint(&format!("{}/customsearch/v1", base_url));

        let candidates = backend.search("QmArt").await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], Candidate::new("https://a.example/1.png", Some("One".into())));
        assert_eq!(candidates[1].title, None);

        let raw = request.await.unwrap();
        assert!(raw.contains("searchType=image"));
        assert!(raw.contains("key=key123"));
        assert!(raw.contains("cx=cx456"));
        assert!(raw.contains("QmArt"));
    }

    #[tokio::test]
    async fn missing_items_is_empty() {
        let (base_url, _request) = mock_json_server(200, r#"{"kind":"customsearch#search"}"#).await;
        let backend = GoogleBackend::new(Some("k".into()), Some("c".into()), "https://gw", reqwest::Client::new())
            .with_endpoint(&base_url);
        assert!(backend.search("QmArt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_network_error() {
        let (base_url, _request) = mock_json_server(403, r#"{"error":"quota"}"#).await;
        let backend = GoogleBackend::new(Some("k".into()), Some("c".into()), "https://gw", reqwest::Client::new())
            .with_endpoint(&base_url);
        match backend.search("QmArt").await {
            Err(ArtwatchError::Network(msg)) => assert!(msg.contains("403")),
            other => panic!("Expected Network error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn disabled_backend_refuses_to_search() {
        let backend = GoogleBackend::new(None, None, "https://gw", reqwest::Client::new());
        assert!(matches!(
            backend.search("QmArt").await,
            Err(ArtwatchError::Configuration(_))
        ));
    }
}
