// crates/artwatch-crawler/src/crawler.rs
//
// Crawler: owns the scan pipeline and the scheduler lifecycle.
//
// Pipeline per artwork:
//   fetch original -> baseline hash -> aggregated search
//   -> for each candidate: fetch -> score -> store (>= store threshold)
//      -> cache + alert (> alert threshold, only after a successful store)
//
// Lifecycle: idle -> running -> idle. `start` runs one cycle immediately and
// then one per tick. `stop` is cooperative and observed between the tick and
// the cycle, between artworks, and during the rate-limit pause. In-flight
// network calls run to completion, bounded by the HTTP client timeout.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use artwatch_core::{
    Alerter, Artwork, ArtworkStore, ArtwatchError, Finding, FindingStatus, ImageFetcher,
};
use artwatch_search::SearchAggregator;

use crate::alert::LogAlerter;
use crate::config::CrawlerConfig;
use crate::notifications::NotificationCache;
use crate::phash::PerceptualHash;
use crate::report::{CrawlerStats, InfringementReport};
use crate::scoring::{SimilarityScore, SimilarityScorer};

#[derive(Default)]
struct Lifecycle {
    running: bool,
    cancel: Option<watch::Sender<bool>>,
}

/// Result of scanning one artwork.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub artwork_id: String,
    /// Candidates returned by the aggregator.
    pub candidates: usize,
    /// Candidates whose image could not be fetched.
    pub fetch_failures: usize,
    /// Findings that were persisted, in candidate order.
    pub findings: Vec<Finding>,
    pub alerts: usize,
}

/// Totals for one pass over the artwork listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub artworks_total: usize,
    pub artworks_scanned: usize,
    pub artworks_failed: usize,
    pub findings_stored: usize,
    pub alerts: usize,
    /// The cycle stopped early on a cancellation request.
    pub cancelled: bool,
}

/// Similarity crawler for registered artworks.
pub struct Crawler {
    store: Arc<dyn ArtworkStore>,
    search: SearchAggregator,
    original_fetcher: Arc<dyn ImageFetcher>,
    candidate_fetcher: Arc<dyn ImageFetcher>,
    scorer: SimilarityScorer,
    alerter: Arc<dyn Alerter>,
    notifications: NotificationCache,
    config: CrawlerConfig,
    lifecycle: Mutex<Lifecycle>,
}

/// Resets the lifecycle when the scan loop exits, including on panic.
struct RunningGuard<'a> {
    lifecycle: &'a Mutex<Lifecycle>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.lifecycle);
        state.running = false;
        state.cancel = None;
    }
}

fn lock(lifecycle: &Mutex<Lifecycle>) -> MutexGuard<'_, Lifecycle> {
    lifecycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

impl Crawler {
    /// Build a crawler. Fails with `Configuration` if `config` is invalid.
    ///
    /// `original_fetcher` retrieves registered artworks (typically the IPFS
    /// gateway chain); `candidate_fetcher` retrieves candidate URLs.
    pub fn new(
        config: CrawlerConfig,
        store: Arc<dyn ArtworkStore>,
        search: SearchAggregator,
        original_fetcher: Arc<dyn ImageFetcher>,
        candidate_fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self, ArtwatchError> {
        config.validate()?;
        Ok(Self {
            store,
            search,
            original_fetcher,
            candidate_fetcher,
            scorer: SimilarityScorer::new(config.tamper_similarity_floor),
            alerter: Arc::new(LogAlerter),
            notifications: NotificationCache::new(),
            config,
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    /// Replace the default log-only alerter.
    pub fn with_alerter(mut self, alerter: Arc<dyn Alerter>) -> Self {
        self.alerter = alerter;
        self
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Names of the search backends queried on each scan.
    pub fn enabled_backends(&self) -> Vec<String> {
        self.search
            .enabled_backends()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn store(&self) -> &Arc<dyn ArtworkStore> {
        &self.store
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Run the scheduler loop until `stop` is called.
    ///
    /// Returns `AlreadyRunning` immediately if a loop is active. Scans once on
    /// entry, then once per `check_interval`.
    pub async fn start(&self) -> Result<(), ArtwatchError> {
        let mut cancel = {
            let mut state = lock(&self.lifecycle);
            if state.running {
                return Err(ArtwatchError::AlreadyRunning);
            }
            let (tx, rx) = watch::channel(false);
            state.running = true;
            state.cancel = Some(tx);
            rx
        };
        let _guard = RunningGuard {
            lifecycle: &self.lifecycle,
        };

        let interval = self.config.check_interval;
        tracing::info!(
            "Crawler started (interval={:?}, backends={:?})",
            interval,
            self.search.enabled_backends()
        );

        self.crawl_all(&mut cancel).await;

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if is_cancelled(&cancel) {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.changed() => {}
            }
            if is_cancelled(&cancel) {
                break;
            }
            self.crawl_all(&mut cancel).await;
        }

        tracing::info!("Crawler stopped");
        Ok(())
    }

    /// Request the scheduler loop to exit. No-op when idle.
    pub fn stop(&self) {
        let state = lock(&self.lifecycle);
        if let Some(cancel) = &state.cancel {
            tracing::info!("Crawler stop requested");
            cancel.send_replace(true);
        }
    }

    /// True from `start` until its loop has exited.
    pub fn is_running(&self) -> bool {
        lock(&self.lifecycle).running
    }

    // ---------------------------------------------------------------
    // Scanning
    // ---------------------------------------------------------------

    /// Run one full cycle outside the scheduler. Not cancellable.
    pub async fn run_cycle(&self) -> CycleSummary {
        let (_keep_open, mut cancel) = watch::channel(false);
        self.crawl_all(&mut cancel).await
    }

    async fn crawl_all(&self, cancel: &mut watch::Receiver<bool>) -> CycleSummary {
        let mut summary = CycleSummary::default();

        let artworks = match self.store.list_artworks().await {
            Ok(artworks) => artworks,
            Err(e) => {
                tracing::error!("Failed to list artworks: {}", e);
                return summary;
            }
        };
        summary.artworks_total = artworks.len();
        tracing::info!("Starting crawl cycle for {} artworks", artworks.len());

        let total = artworks.len();
        for (i, artwork) in artworks.iter().enumerate() {
            if is_cancelled(cancel) {
                summary.cancelled = true;
                break;
            }

            tracing::info!("[{}/{}] Checking artwork {}", i + 1, total, artwork.id);
            match self.process_artwork(artwork).await {
                Ok(outcome) => {
                    summary.artworks_scanned += 1;
                    summary.findings_stored += outcome.findings.len();
                    summary.alerts += outcome.alerts;
                }
                Err(e) => {
                    summary.artworks_failed += 1;
                    tracing::warn!("Error checking artwork {}: {}", artwork.id, e);
                }
            }

            if i + 1 < total && self.pause(cancel).await {
                summary.cancelled = true;
                break;
            }
        }

        tracing::info!(
            "Crawl cycle completed: {}/{} scanned, {} findings, {} alerts{}",
            summary.artworks_scanned,
            summary.artworks_total,
            summary.findings_stored,
            summary.alerts,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        summary
    }

    /// Rate-limit pause between artworks. Returns true if cancelled.
    async fn pause(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        let delay = self.config.rate_limit_delay;
        if delay.is_zero() {
            return is_cancelled(cancel);
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => is_cancelled(cancel),
            changed = cancel.changed() => changed.is_err() || is_cancelled(cancel),
        }
    }

    /// Scan one artwork end to end.
    ///
    /// Errors when the original cannot be fetched or hashed, or when every
    /// search backend failed. Per-candidate fetch and store failures are
    /// logged and skipped.
    pub async fn process_artwork(&self, artwork: &Artwork) -> Result<ScanOutcome, ArtwatchError> {
        let mut outcome = ScanOutcome {
            artwork_id: artwork.id.clone(),
            ..ScanOutcome::default()
        };

        let original = self.original_fetcher.fetch(&artwork.content_ref).await?;
        let baseline = self.hash_original(original).await?;
        tracing::debug!("Baseline hash for {}: {}", artwork.id, baseline);

        let candidates = self.search.search(&artwork.content_ref).await?;
        outcome.candidates = candidates.len();

        for candidate in candidates {
            let bytes = match self.candidate_fetcher.fetch(&candidate.url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    outcome.fetch_failures += 1;
                    tracing::warn!("Failed to fetch candidate {}: {}", candidate.url, e);
                    continue;
                }
            };

            let Some(score) = self.score_candidate(baseline, bytes).await else {
                tracing::warn!("Skipping undecodable candidate {}", candidate.url);
                continue;
            };
            if !self.config.should_store(score.similarity) {
                continue;
            }

            let finding = Finding::new(&artwork.id, &candidate.url, score.distance, score.tampered);
            if let Err(e) = self.store.save_finding(&finding).await {
                tracing::warn!("Failed to store finding for {}: {}", artwork.id, e);
                continue;
            }

            tracing::info!(
                "Found match: {} ({:.1}% similar{})",
                finding.found_url,
                finding.similarity_score * 100.0,
                if finding.tamper_detected { ", tampered" } else { "" }
            );

            self.notifications.add(&artwork.owner_id, finding.clone()).await;

            if self.config.should_alert(finding.similarity_score) {
                tracing::warn!(
                    "ALERT: high similarity match for artwork {}: {}",
                    artwork.id,
                    finding.found_url
                );
                self.alerter.alert(artwork, &finding);
                outcome.alerts += 1;
            }

            outcome.findings.push(finding);
        }

        Ok(outcome)
    }

    async fn hash_original(&self, bytes: Vec<u8>) -> Result<PerceptualHash, ArtwatchError> {
        let hasher = *self.scorer.hasher();
        tokio::task::spawn_blocking(move || hasher.hash_bytes(&bytes))
            .await
            .map_err(|e| ArtwatchError::Decode(format!("hash task failed: {}", e)))?
    }

    async fn score_candidate(&self, baseline: PerceptualHash, bytes: Vec<u8>) -> Option<SimilarityScore> {
        let scorer = self.scorer;
        match tokio::task::spawn_blocking(move || scorer.score(&baseline, &bytes)).await {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Scoring task failed: {}", e);
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Findings, notifications and reports
    // ---------------------------------------------------------------

    /// Set a finding's status in the store and mirror it into the cache.
    /// `NotFound` for an unknown id; re-setting the current status succeeds.
    pub async fn update_finding_status(
        &self,
        finding_id: &str,
        status: FindingStatus,
    ) -> Result<(), ArtwatchError> {
        self.store.update_finding_status(finding_id, status).await?;
        self.notifications.set_status(finding_id, status).await;
        Ok(())
    }

    pub async fn notifications(&self, owner_id: &str) -> Vec<Finding> {
        self.notifications.notifications(owner_id).await
    }

    pub async fn unread_count(&self, owner_id: &str) -> usize {
        self.notifications.unread_count(owner_id).await
    }

    pub async fn clear_notifications(&self, owner_id: &str) {
        self.notifications.clear(owner_id).await
    }

    pub async fn findings_for_artwork(&self, artwork_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        self.store.findings_by_artwork(artwork_id).await
    }

    pub async fn findings_for_owner(&self, owner_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        self.store.findings_by_owner(owner_id).await
    }

    /// Bucketed report of every finding for one artwork. `NotFound` if the
    /// artwork is not registered.
    pub async fn generate_report(&self, artwork_id: &str) -> Result<InfringementReport, ArtwatchError> {
        self.store.get_artwork(artwork_id).await?;
        let findings = self.store.findings_by_artwork(artwork_id).await?;
        Ok(InfringementReport::build(artwork_id, findings))
    }

    pub async fn stats_for_owner(&self, owner_id: &str) -> Result<CrawlerStats, ArtwatchError> {
        let findings = self.store.findings_by_owner(owner_id).await?;
        Ok(CrawlerStats::build(owner_id, &findings))
    }
}
