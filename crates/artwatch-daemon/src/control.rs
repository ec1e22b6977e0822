// crates/artwatch-daemon/src/control.rs
//
// Control endpoint for the running daemon.
//
// The daemon is the only process that opens the store, so operator commands
// (import, scan, mark, listing, notifications, reports) are sent here instead
// of touching RocksDB directly. A single `POST /rpc` route accepts a JSON
// envelope with a method name and params, dispatches to the crawler, and
// answers with a success flag plus either a result or an error message.
//
// Methods:
//   artwork/import       ImportParams       -> ImportResult
//   scan/batch           ScanParams         -> BatchSummary
//   finding/list         FindingListParams  -> Vec<Finding>
//   finding/mark         MarkParams         -> MarkResult
//   notification/list    OwnerParams        -> NotificationsResult
//   notification/unread  OwnerParams        -> UnreadResult
//   notification/clear   OwnerParams        -> UnreadResult
//   report/artwork       ArtworkParams      -> InfringementReport
//   stats/owner          OwnerParams        -> CrawlerStats
//   crawler/status       (none)             -> DaemonStatus

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use artwatch_core::{Artwork, ArtwatchError, Finding, FindingStatus};
use artwatch_crawler::Crawler;
use artwatch_store::{MemoryStore, RocksStore};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A control request: method name plus JSON params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    /// The method to invoke (e.g. "scan/batch", "finding/mark").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A control response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Params and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportParams {
    pub artworks: Vec<Artwork>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanParams {
    pub artwork_ids: Vec<String>,
}

/// Exactly one of the two filters must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingListParams {
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub artwork_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkParams {
    pub finding_id: String,
    pub status: FindingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkResult {
    pub finding_id: String,
    pub status: FindingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerParams {
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtworkParams {
    pub artwork_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResult {
    pub owner_id: String,
    pub unread: usize,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadResult {
    pub owner_id: String,
    pub unread: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub backends: Vec<String>,
}

// ---------------------------------------------------------------------------
// Artwork registry
// ---------------------------------------------------------------------------

/// Write access to the artwork registry, for `artwork/import`.
pub trait ArtworkRegistry: Send + Sync {
    fn save_artwork(&self, artwork: &Artwork) -> Result<(), ArtwatchError>;
}

impl ArtworkRegistry for RocksStore {
    fn save_artwork(&self, artwork: &Artwork) -> Result<(), ArtwatchError> {
        RocksStore::save_artwork(self, artwork)
    }
}

impl ArtworkRegistry for MemoryStore {
    fn save_artwork(&self, artwork: &Artwork) -> Result<(), ArtwatchError> {
        MemoryStore::save_artwork(self, artwork)
    }
}

// ---------------------------------------------------------------------------
// ControlState
// ---------------------------------------------------------------------------

/// Shared state behind the control endpoint.
#[derive(Clone)]
pub struct ControlState {
    crawler: Arc<Crawler>,
    registry: Arc<dyn ArtworkRegistry>,
}

impl std::fmt::Debug for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlState")
            .field("running", &self.crawler.is_running())
            .finish()
    }
}

impl ControlState {
    pub fn new(crawler: Arc<Crawler>, registry: Arc<dyn ArtworkRegistry>) -> Self {
        Self { crawler, registry }
    }

    /// Route a request to its handler and wrap the outcome.
    pub async fn dispatch(&self, request: ControlRequest) -> ControlResponse {
        tracing::debug!("Control call: {}", request.method);
        let result = match request.method.as_str() {
            "artwork/import" => dispatch_handler(request.params, |r| self.import(r)).await,
            "scan/batch" => dispatch_handler(request.params, |r| self.scan(r)).await,
            "finding/list" => dispatch_handler(request.params, |r| self.list_findings(r)).await,
            "finding/mark" => dispatch_handler(request.params, |r| self.mark(r)).await,
            "notification/list" => {
                dispatch_handler(request.params, |r| self.notifications(r)).await
            }
            "notification/unread" => dispatch_handler(request.params, |r| self.unread(r)).await,
            "notification/clear" => {
                dispatch_handler(request.params, |r| self.clear_notifications(r)).await
            }
            "report/artwork" => dispatch_handler(request.params, |r| self.report(r)).await,
            "stats/owner" => dispatch_handler(request.params, |r| self.stats(r)).await,
            "crawler/status" => to_json(self.status()),
            _ => Err(format!("Unknown method: {}", request.method)),
        };

        match result {
            Ok(value) => ControlResponse {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => {
                tracing::debug!("Control call {} failed: {}", request.method, err);
                ControlResponse {
                    success: false,
                    result: None,
                    error: Some(err),
                }
            }
        }
    }

    async fn import(&self, params: ImportParams) -> Result<ImportResult, String> {
        for artwork in &params.artworks {
            if artwork.id.trim().is_empty() || artwork.content_ref.trim().is_empty() {
                return Err(format!(
                    "artwork entries need a non-empty id and content_ref (got id {:?})",
                    artwork.id
                ));
            }
        }
        for artwork in &params.artworks {
            self.registry.save_artwork(artwork).map_err(|e| error_message(&e))?;
        }
        tracing::info!("Imported {} artworks", params.artworks.len());
        Ok(ImportResult {
            imported: params.artworks.len(),
        })
    }

    async fn scan(&self, params: ScanParams) -> Result<artwatch_crawler::BatchSummary, String> {
        if params.artwork_ids.is_empty() {
            return Err("scan needs at least one artwork id".to_string());
        }
        self.crawler
            .process_batch(&params.artwork_ids)
            .await
            .map_err(|e| error_message(&e))
    }

    async fn list_findings(&self, params: FindingListParams) -> Result<Vec<Finding>, String> {
        let findings = match (params.owner_id, params.artwork_id) {
            (Some(owner), None) => self.crawler.findings_for_owner(&owner).await,
            (None, Some(artwork)) => self.crawler.findings_for_artwork(&artwork).await,
            _ => return Err("pass exactly one of owner_id or artwork_id".to_string()),
        };
        findings.map_err(|e| error_message(&e))
    }

    async fn mark(&self, params: MarkParams) -> Result<MarkResult, String> {
        self.crawler
            .update_finding_status(&params.finding_id, params.status)
            .await
            .map_err(|e| error_message(&e))?;
        Ok(MarkResult {
            finding_id: params.finding_id,
            status: params.status,
        })
    }

    async fn notifications(&self, params: OwnerParams) -> Result<NotificationsResult, String> {
        let findings = self.crawler.notifications(&params.owner_id).await;
        let unread = self.crawler.unread_count(&params.owner_id).await;
        Ok(NotificationsResult {
            owner_id: params.owner_id,
            unread,
            findings,
        })
    }

    async fn unread(&self, params: OwnerParams) -> Result<UnreadResult, String> {
        let unread = self.crawler.unread_count(&params.owner_id).await;
        Ok(UnreadResult {
            owner_id: params.owner_id,
            unread,
        })
    }

    async fn clear_notifications(&self, params: OwnerParams) -> Result<UnreadResult, String> {
        self.crawler.clear_notifications(&params.owner_id).await;
        Ok(UnreadResult {
            owner_id: params.owner_id,
            unread: 0,
        })
    }

    async fn report(
        &self,
        params: ArtworkParams,
    ) -> Result<artwatch_crawler::InfringementReport, String> {
        self.crawler
            .generate_report(&params.artwork_id)
            .await
            .map_err(|e| error_message(&e))
    }

    async fn stats(&self, params: OwnerParams) -> Result<artwatch_crawler::CrawlerStats, String> {
        self.crawler
            .stats_for_owner(&params.owner_id)
            .await
            .map_err(|e| error_message(&e))
    }

    fn status(&self) -> DaemonStatus {
        DaemonStatus {
            running: self.crawler.is_running(),
            backends: self.crawler.enabled_backends(),
        }
    }
}

/// Deserialize params into a request type, call the handler, and serialize
/// the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    to_json(response)
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|e| format!("Failed to serialize response: {}", e))
}

/// Error text for the envelope. Batch failures list every failed id.
fn error_message(e: &ArtwatchError) -> String {
    match e {
        ArtwatchError::Batch { failures, .. } => {
            let mut lines = vec![e.to_string()];
            lines.extend(failures.iter().map(|f| format!("  {}", f)));
            lines.join("\n")
        }
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// HTTP wiring
// ---------------------------------------------------------------------------

/// The control routes: `POST /rpc` and `GET /healthz`.
pub fn router(state: ControlState) -> Router {
    Router::new()
        .route("/rpc", post(rpc_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn rpc_handler(
    State(state): State<ControlState>,
    Json(request): Json<ControlRequest>,
) -> Json<ControlResponse> {
    Json(state.dispatch(request).await)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Serve the control routes on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ControlState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Control endpoint listening on http://{}/rpc", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
