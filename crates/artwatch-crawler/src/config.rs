// crates/artwatch-crawler/src/config.rs
//
// Crawler tuning knobs and the threshold policy built on them.
//
// Ordering invariant: tamper_similarity_floor >= alert_threshold >= similarity_threshold.
// A candidate is stored when similarity >= similarity_threshold and alerted
// only when it was stored and similarity > alert_threshold.

use std::time::Duration;

use artwatch_core::ArtwatchError;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.70;
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.80;
pub const DEFAULT_TAMPER_SIMILARITY_FLOOR: f64 = 0.85;
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;

/// Runtime configuration for the crawler.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlerConfig {
    /// Minimum similarity for a candidate to be persisted as a finding.
    pub similarity_threshold: f64,
    /// Similarity above which a persisted finding also raises an alert.
    pub alert_threshold: f64,
    /// Similarity above which a non-identical match is flagged as tampered.
    pub tamper_similarity_floor: f64,
    /// Period between scheduled cycles.
    pub check_interval: Duration,
    /// Pause between artworks within a cycle.
    pub rate_limit_delay: Duration,
    /// Maximum artwork scans in flight during a batch.
    pub batch_concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            tamper_similarity_floor: DEFAULT_TAMPER_SIMILARITY_FLOOR,
            check_interval: DEFAULT_CHECK_INTERVAL,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl CrawlerConfig {
    /// Reject out-of-range values and threshold orderings that would let an
    /// alert fire for a candidate that was never stored.
    pub fn validate(&self) -> Result<(), ArtwatchError> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("alert_threshold", self.alert_threshold),
            ("tamper_similarity_floor", self.tamper_similarity_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ArtwatchError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.alert_threshold < self.similarity_threshold {
            return Err(ArtwatchError::Configuration(format!(
                "alert_threshold ({}) must not be below similarity_threshold ({})",
                self.alert_threshold, self.similarity_threshold
            )));
        }

        if self.tamper_similarity_floor < self.alert_threshold {
            return Err(ArtwatchError::Configuration(format!(
                "tamper_similarity_floor ({}) must not be below alert_threshold ({})",
                self.tamper_similarity_floor, self.alert_threshold
            )));
        }

        if self.batch_concurrency == 0 {
            return Err(ArtwatchError::Configuration(
                "batch_concurrency must be at least 1".to_string(),
            ));
        }

        if self.check_interval.is_zero() {
            return Err(ArtwatchError::Configuration(
                "check_interval must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a candidate with this similarity becomes a persisted finding.
    pub fn should_store(&self, similarity: f64) -> bool {
        similarity >= self.similarity_threshold
    }

    /// Whether a candidate with this similarity raises an alert. Never true
    /// for a candidate that would not be stored.
    pub fn should_alert(&self, similarity: f64) -> bool {
        self.should_store(similarity) && similarity > self.alert_threshold
    }
}
