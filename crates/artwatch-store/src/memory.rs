// crates/artwatch-store/src/memory.rs
//
// In-memory store implementing the `ArtworkStore` trait.
//
// Backs tests and `--dry-run` daemons. Artworks are listed in insertion
// order; findings per artwork/owner in the order they were saved.

use std::sync::RwLock;

use async_trait::async_trait;

use artwatch_core::{Artwork, ArtworkStore, ArtwatchError, Finding, FindingStatus};

#[derive(Debug, Default)]
struct Inner {
    artworks: Vec<Artwork>,
    findings: Vec<Finding>,
}

/// In-memory artwork/finding store guarded by a single `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with artworks.
    pub fn with_artworks(artworks: Vec<Artwork>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                artworks,
                findings: Vec::new(),
            }),
        }
    }

    /// Store or replace an artwork record. Replacements keep their position.
    pub fn save_artwork(&self, artwork: &Artwork) -> Result<(), ArtwatchError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        match inner.artworks.iter_mut().find(|a| a.id == artwork.id) {
            Some(existing) => *existing = artwork.clone(),
            None => inner.artworks.push(artwork.clone()),
        }
        Ok(())
    }

    /// Number of findings currently stored.
    pub fn finding_count(&self) -> usize {
        self.inner.read().map(|i| i.findings.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ArtworkStore for MemoryStore {
    async fn list_artworks(&self) -> Result<Vec<Artwork>, ArtwatchError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(inner.artworks.clone())
    }

    async fn get_artwork(&self, id: &str) -> Result<Artwork, ArtwatchError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        inner
            .artworks
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| ArtwatchError::NotFound(format!("artwork {}", id)))
    }

    async fn save_finding(&self, finding: &Finding) -> Result<(), ArtwatchError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        if !inner.artworks.iter().any(|a| a.id == finding.original_artwork_id) {
            return Err(ArtwatchError::NotFound(format!(
                "artwork {}",
                finding.original_artwork_id
            )));
        }
        inner.findings.push(finding.clone());
        Ok(())
    }

    async fn findings_by_artwork(&self, artwork_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(inner
            .findings
            .iter()
            .filter(|f| f.original_artwork_id == artwork_id)
            .cloned()
            .collect())
    }

    async fn findings_by_owner(&self, owner_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        let owned: Vec<&str> = inner
            .artworks
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .map(|a| a.id.as_str())
            .collect();
        Ok(inner
            .findings
            .iter()
            .filter(|f| owned.contains(&f.original_artwork_id.as_str()))
            .cloned()
            .collect())
    }

    async fn update_finding_status(
        &self,
        finding_id: &str,
        status: FindingStatus,
    ) -> Result<(), ArtwatchError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| ArtwatchError::Storage(format!("RwLock poisoned: {}", e)))?;
        let finding = inner
            .findings
            .iter_mut()
            .find(|f| f.id == finding_id)
            .ok_or_else(|| ArtwatchError::NotFound(format!("finding {}", finding_id)))?;
        finding.status = status;
        Ok(())
    }
}
