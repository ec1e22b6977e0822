// crates/artwatch-search/src/bing.rs
//
// Bing Visual Search backend.
//
// POST {endpoint} with JSON body {"url": image_url} and the subscription key
// in the `Ocp-Apim-Subscription-Key` header. Candidates are nested under
// tags[].actions[].data.value[].

use async_trait::async_trait;
use serde::Deserialize;

use artwatch_core::{ArtwatchError, Candidate, SearchBackend};

use crate::{check_status, non_empty, public_image_url};

pub const BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/images/visualsearch";

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(default)]
    tags: Vec<BingTag>,
}

#[derive(Debug, Deserialize)]
struct BingTag {
    #[serde(default)]
    actions: Vec<BingAction>,
}

#[derive(Debug, Deserialize)]
struct BingAction {
    #[serde(default)]
    data: Option<BingData>,
}

#[derive(Debug, Deserialize)]
struct BingData {
    #[serde(default)]
    value: Vec<BingValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingValue {
    content_url: String,
    #[serde(default)]
    name: Option<String>,
}

/// Bing Visual Search backend.
#[derive(Debug, Clone)]
pub struct BingBackend {
    api_key: Option<String>,
    gateway_base: String,
    endpoint: String,
    client: reqwest::Client,
}

impl BingBackend {
    pub fn new(api_key: Option<String>, gateway_base: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: non_empty(api_key),
            gateway_base: gateway_base.to_string(),
            endpoint: BING_ENDPOINT.to_string(),
            client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for BingBackend {
    fn name(&self) -> &str {
        "bing"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError> {
        let Some(key) = &self.api_key else {
            return Err(ArtwatchError::Configuration(
                "Bing API key not configured".to_string(),
            ));
        };
        let image_url = public_image_url(&self.gateway_base, content_ref);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", key.as_str())
            .json(&serde_json::json!({ "url": image_url }))
            .send()
            .await
            .map_err(|e| ArtwatchError::Network(format!("Bing request failed: {}", e)))?;

        check_status("Bing", &response)?;

        let body: BingResponse = response
            .json()
            .await
            .map_err(|e| ArtwatchError::Serialization(format!("Bing response parse failed: {}", e)))?;

        Ok(body
            .tags
            .into_iter()
            .flat_map(|tag| tag.actions)
            .filter_map(|action| action.data)
            .flat_map(|data| data.value)
            .map(|v| Candidate::new(v.content_url, v.name))
            .collect())
    }
}
