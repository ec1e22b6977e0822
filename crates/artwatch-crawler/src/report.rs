// crates/artwatch-crawler/src/report.rs
//
// Infringement reports (per artwork) and crawler statistics (per owner),
// computed from stored findings.
//
// Similarity buckets: high >= 0.90, medium >= 0.70, low below that.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use artwatch_core::{Finding, FindingStatus};

pub const HIGH_SIMILARITY: f64 = 0.90;
pub const MEDIUM_SIMILARITY: f64 = 0.70;

/// Window for `CrawlerStats::recent_findings`.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityBucket {
    High,
    Medium,
    Low,
}

impl SimilarityBucket {
    pub fn of(similarity: f64) -> Self {
        if similarity >= HIGH_SIMILARITY {
            SimilarityBucket::High
        } else if similarity >= MEDIUM_SIMILARITY {
            SimilarityBucket::Medium
        } else {
            SimilarityBucket::Low
        }
    }
}

/// All findings of one artwork, grouped by similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfringementReport {
    pub artwork_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_findings: usize,
    pub high_similarity: Vec<Finding>,
    pub medium_similarity: Vec<Finding>,
    pub low_similarity: Vec<Finding>,
}

impl InfringementReport {
    pub fn build(artwork_id: &str, findings: Vec<Finding>) -> Self {
        let total_findings = findings.len();
        let mut report = Self {
            artwork_id: artwork_id.to_string(),
            generated_at: Utc::now(),
            total_findings,
            high_similarity: Vec::new(),
            medium_similarity: Vec::new(),
            low_similarity: Vec::new(),
        };

        for finding in findings {
            match SimilarityBucket::of(finding.similarity_score) {
                SimilarityBucket::High => report.high_similarity.push(finding),
                SimilarityBucket::Medium => report.medium_similarity.push(finding),
                SimilarityBucket::Low => report.low_similarity.push(finding),
            }
        }

        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub read: usize,
    pub verified: usize,
    pub dismissed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Aggregate view over one owner's findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerStats {
    pub owner_id: String,
    pub total_findings: usize,
    pub by_status: StatusCounts,
    pub by_similarity: BucketCounts,
    pub tampered: usize,
    /// Findings detected within the last `RECENT_WINDOW_DAYS` days.
    pub recent_findings: usize,
}

impl CrawlerStats {
    pub fn build(owner_id: &str, findings: &[Finding]) -> Self {
        Self::build_at(owner_id, findings, Utc::now())
    }

    /// Same as `build` with an explicit "now", for deterministic windows.
    pub fn build_at(owner_id: &str, findings: &[Finding], now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut by_status = StatusCounts::default();
        let mut by_similarity = BucketCounts::default();
        let mut tampered = 0;
        let mut recent_findings = 0;

        for finding in findings {
            match finding.status {
                FindingStatus::Pending => by_status.pending += 1,
                FindingStatus::Read => by_status.read += 1,
                FindingStatus::Verified => by_status.verified += 1,
                FindingStatus::Dismissed => by_status.dismissed += 1,
            }
            match SimilarityBucket::of(finding.similarity_score) {
                SimilarityBucket::High => by_similarity.high += 1,
                SimilarityBucket::Medium => by_similarity.medium += 1,
                SimilarityBucket::Low => by_similarity.low += 1,
            }
            if finding.tamper_detected {
                tampered += 1;
            }
            if finding.detected_at > cutoff {
                recent_findings += 1;
            }
        }

        Self {
            owner_id: owner_id.to_string(),
            total_findings: findings.len(),
            by_status,
            by_similarity,
            tampered,
            recent_findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(SimilarityBucket::of(1.0), SimilarityBucket::High);
        assert_eq!(SimilarityBucket::of(0.90), SimilarityBucket::High);
        assert_eq!(SimilarityBucket::of(0.8906), SimilarityBucket::Medium);
        assert_eq!(SimilarityBucket::of(0.70), SimilarityBucket::Medium);
        assert_eq!(SimilarityBucket::of(0.6875), SimilarityBucket::Low);
    }

    #[test]
    fn report_groups_by_similarity() {
        let findings = vec![
            Finding::new("art-1", "https://a.example/0", 0, false),  // 1.0
            Finding::new("art-1", "https://a.example/1", 5, true),   // 0.92
            Finding::new("art-1", "https://a.example/2", 12, false), // 0.8125
            Finding::new("art-1", "https://a.example/3", 30, false), // 0.53
        ];
        let report = InfringementReport::build("art-1", findings);
        assert_eq!(report.total_findings, 4);
        assert_eq!(report.high_similarity.len(), 2);
        assert_eq!(report.medium_similarity.len(), 1);
        assert_eq!(report.low_similarity.len(), 1);
        assert_eq!(report.medium_similarity[0].found_url, "https://a.example/2");
    }

    #[test]
    fn stats_count_status_tamper_and_recency() {
        let now = Utc::now();
        let mut old = Finding::new("art-1", "https://a.example/old", 2, true);
        old.detected_at = now - Duration::days(10);
        old.status = FindingStatus::Verified;
        let mut read = Finding::new("art-1", "https://a.example/read", 15, false);
        read.status = FindingStatus::Read;
        let pending = Finding::new("art-2", "https://a.example/new", 0, false);

        let stats = CrawlerStats::build_at("alice", &[old, read, pending], now);
        assert_eq!(stats.total_findings, 3);
        assert_eq!(
            stats.by_status,
            StatusCounts {
                pending: 1,
                read: 1,
                verified: 1,
                dismissed: 0
            }
        );
        assert_eq!(
            stats.by_similarity,
            BucketCounts {
                high: 2,
                medium: 1,
                low: 0
            }
        );
        assert_eq!(stats.tampered, 1);
        assert_eq!(stats.recent_findings, 2);
    }

    #[test]
    fn empty_owner_stats_are_zero() {
        let stats = CrawlerStats::build("nobody", &[]);
        assert_eq!(stats.total_findings, 0);
        assert_eq!(stats.by_status, StatusCounts::default());
    }
}
