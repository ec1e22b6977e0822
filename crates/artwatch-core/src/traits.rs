// crates/artwatch-core/src/traits.rs

use async_trait::async_trait;

use crate::artwork::Artwork;
use crate::error::ArtwatchError;
use crate::finding::{Candidate, Finding, FindingStatus};

/// Trait for the artwork and finding store.
///
/// Implemented by artwatch-store (RocksDB and in-memory backends). Must be
/// safe for concurrent use by the scheduler and batch scans at once.
#[async_trait]
pub trait ArtworkStore: Send + Sync {
    /// Snapshot of every registered artwork.
    async fn list_artworks(&self) -> Result<Vec<Artwork>, ArtwatchError>;

    /// Look up one artwork. `NotFound` if absent.
    async fn get_artwork(&self, id: &str) -> Result<Artwork, ArtwatchError>;

    /// Persist a new finding.
    async fn save_finding(&self, finding: &Finding) -> Result<(), ArtwatchError>;

    /// All findings recorded against one artwork, in detection order.
    async fn findings_by_artwork(&self, artwork_id: &str) -> Result<Vec<Finding>, ArtwatchError>;

    /// All findings across the artworks of one owner, in detection order.
    async fn findings_by_owner(&self, owner_id: &str) -> Result<Vec<Finding>, ArtwatchError>;

    /// Overwrite a finding's status. `NotFound` if the id is unknown.
    async fn update_finding_status(
        &self,
        finding_id: &str,
        status: FindingStatus,
    ) -> Result<(), ArtwatchError>;
}

/// A reverse-image search provider.
///
/// Implemented by artwatch-search (Google, TinEye, Bing).
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Whether the provider's credentials are present.
    fn is_enabled(&self) -> bool;

    /// Return candidate matches for the given content reference.
    async fn search(&self, content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError>;
}

/// Retrieves raw image bytes for a reference (CID or URL).
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ArtwatchError>;
}

/// Fire-and-forget alert sink for high-similarity findings.
///
/// Implementations must not block the scan path and must swallow their own
/// delivery failures.
pub trait Alerter: Send + Sync {
    fn alert(&self, artwork: &Artwork, finding: &Finding);
}
