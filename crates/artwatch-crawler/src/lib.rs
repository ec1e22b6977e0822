// crates/artwatch-crawler/src/lib.rs
//
// artwatch-crawler: Similarity crawler for registered artworks.
//
// Fetches each registered artwork, fingerprints it with a perceptual hash,
// looks for copies through the search aggregator, scores every candidate and
// records the close matches as findings. Runs on a schedule (`Crawler::start`)
// or on demand (`Crawler::process_batch`).

pub mod alert;
pub mod batch;
pub mod config;
pub mod crawler;
pub mod notifications;
pub mod phash;
pub mod report;
pub mod scoring;

pub use alert::{LogAlerter, WebhookAlerter};
pub use batch::BatchSummary;
pub use config::CrawlerConfig;
pub use crawler::{Crawler, CycleSummary, ScanOutcome};
pub use notifications::NotificationCache;
pub use phash::{compare_hashes, PerceptualHash, PerceptualHasher};
pub use report::{CrawlerStats, InfringementReport, SimilarityBucket};
pub use scoring::{SimilarityScore, SimilarityScorer};
