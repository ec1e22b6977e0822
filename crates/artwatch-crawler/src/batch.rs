// crates/artwatch-crawler/src/batch.rs
//
// On-demand batch scans with a hard cap on concurrent artwork scans.
//
// Every id is dispatched and awaited; one failure never cancels its siblings.
// Failures are collected per id and returned together.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use artwatch_core::{ArtwatchError, BatchFailure};

use crate::crawler::{Crawler, ScanOutcome};

/// Totals for a batch that completed without failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub findings_stored: usize,
    pub alerts: usize,
    pub outcomes: Vec<ScanOutcome>,
}

impl Crawler {
    /// Scan the given artwork ids with at most `batch_concurrency` in flight.
    ///
    /// Waits for every unit. Returns `ArtwatchError::Batch` carrying every
    /// per-id failure if at least one unit failed.
    pub async fn process_batch(self: &Arc<Self>, artwork_ids: &[String]) -> Result<BatchSummary, ArtwatchError> {
        let permits = Arc::new(Semaphore::new(self.config().batch_concurrency));
        let total = artwork_ids.len();
        tracing::info!(
            "Processing batch of {} artworks (concurrency={})",
            total,
            self.config().batch_concurrency
        );

        let mut handles: Vec<(String, JoinHandle<Result<ScanOutcome, ArtwatchError>>)> =
            Vec::with_capacity(total);

        for id in artwork_ids {
            let crawler = Arc::clone(self);
            let permits = Arc::clone(&permits);
            let artwork_id = id.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ArtwatchError::Configuration(format!("batch pool closed: {}", e)))?;
                let artwork = crawler.store().get_artwork(&artwork_id).await?;
                crawler.process_artwork(&artwork).await
            });
            handles.push((id.clone(), handle));
        }

        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        let mut failures = Vec::new();

        for (artwork_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ArtwatchError::Storage(format!("scan task aborted: {}", e))),
            };
            match result {
                Ok(outcome) => {
                    summary.findings_stored += outcome.findings.len();
                    summary.alerts += outcome.alerts;
                    summary.outcomes.push(outcome);
                }
                Err(error) => {
                    tracing::warn!("Batch scan failed for {}: {}", artwork_id, error);
                    failures.push(BatchFailure { artwork_id, error });
                }
            }
        }

        if failures.is_empty() {
            tracing::info!(
                "Batch complete: {} artworks, {} findings",
                total,
                summary.findings_stored
            );
            Ok(summary)
        } else {
            Err(ArtwatchError::Batch { total, failures })
        }
    }
}
