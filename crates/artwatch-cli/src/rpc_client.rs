// crates/artwatch-cli/src/rpc_client.rs
//
// Lightweight control client that POSTs to the artwatch-daemon endpoint.
// The daemon owns the store; every command goes through it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use artwatch_core::{Artwork, Finding, FindingStatus};
use artwatch_crawler::{BatchSummary, CrawlerStats, InfringementReport};
use artwatch_daemon::control::{
    ArtworkParams, DaemonStatus, FindingListParams, ImportParams, ImportResult, MarkParams,
    MarkResult, NotificationsResult, OwnerParams, ScanParams, UnreadResult,
};
use artwatch_daemon::{ControlRequest, ControlResponse};

use crate::commands::CliError;

/// Client for the daemon's control endpoint.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    endpoint: String,
    client: reqwest::Client,
}

impl DaemonClient {
    /// `endpoint` is the full RPC URL, e.g. `http://127.0.0.1:7878/rpc`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one call and decode its result.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, CliError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = ControlRequest {
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(artwatch_core::ArtwatchError::from)?,
        };

        let unreachable = |source| CliError::Unreachable {
            endpoint: self.endpoint.clone(),
            source,
        };
        let response: ControlResponse = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(unreachable)?
            .json()
            .await
            .map_err(unreachable)?;

        if !response.success {
            return Err(CliError::Daemon(
                response
                    .error
                    .unwrap_or_else(|| format!("{} failed without an error message", method)),
            ));
        }
        let result = response.result.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(result).map_err(artwatch_core::ArtwatchError::from)?)
    }

    pub async fn import(&self, artworks: Vec<Artwork>) -> Result<ImportResult, CliError> {
        self.call("artwork/import", &ImportParams { artworks }).await
    }

    pub async fn scan(&self, artwork_ids: &[String]) -> Result<BatchSummary, CliError> {
        let params = ScanParams {
            artwork_ids: artwork_ids.to_vec(),
        };
        self.call("scan/batch", &params).await
    }

    pub async fn findings(&self, params: FindingListParams) -> Result<Vec<Finding>, CliError> {
        self.call("finding/list", &params).await
    }

    pub async fn mark(&self, finding_id: &str, status: FindingStatus) -> Result<MarkResult, CliError> {
        let params = MarkParams {
            finding_id: finding_id.to_string(),
            status,
        };
        self.call("finding/mark", &params).await
    }

    pub async fn notifications(&self, owner_id: &str) -> Result<NotificationsResult, CliError> {
        self.call("notification/list", &owner(owner_id)).await
    }

    pub async fn clear_notifications(&self, owner_id: &str) -> Result<(), CliError> {
        let _: UnreadResult = self.call("notification/clear", &owner(owner_id)).await?;
        Ok(())
    }

    pub async fn report(&self, artwork_id: &str) -> Result<InfringementReport, CliError> {
        let params = ArtworkParams {
            artwork_id: artwork_id.to_string(),
        };
        self.call("report/artwork", &params).await
    }

    pub async fn stats(&self, owner_id: &str) -> Result<CrawlerStats, CliError> {
        self.call("stats/owner", &owner(owner_id)).await
    }

    pub async fn status(&self) -> Result<DaemonStatus, CliError> {
        self.call("crawler/status", &serde_json::Value::Null).await
    }
}

fn owner(owner_id: &str) -> OwnerParams {
    OwnerParams {
        owner_id: owner_id.to_string(),
    }
}
