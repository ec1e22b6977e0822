// crates/artwatch-store/src/rocks.rs
//
// RocksDB-backed persistent storage for artworks and findings.
//
// Key format:
//   - Artwork:   `artwork:{artwork_id}` -> JSON-serialized Artwork
//   - Finding:   `finding:{finding_id}` -> JSON-serialized Finding
//   - Secondary: `finding_by_artwork:{artwork_id}:{finding_id}` -> empty value
//   - Secondary: `finding_by_owner:{owner_id}:{finding_id}` -> empty value
//
// The secondary indexes allow listing findings per artwork and per owner
// without scanning the entire keyspace. A finding and its two index entries
// are committed in one WriteBatch, so no index entry exists without its record.

use std::sync::Mutex;

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};

use artwatch_core::{Artwork, ArtworkStore, ArtwatchError, Finding, FindingStatus};

const ARTWORK_PREFIX: &str = "artwork:";

/// RocksDB wrapper implementing the `ArtworkStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serializes read-modify-write status updates.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, ArtwatchError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            ArtwatchError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn artwork_key(id: &str) -> Vec<u8> {
        format!("{}{}", ARTWORK_PREFIX, id).into_bytes()
    }

    fn finding_key(id: &str) -> Vec<u8> {
        format!("finding:{}", id).into_bytes()
    }

    fn by_artwork_prefix(artwork_id: &str) -> String {
        format!("finding_by_artwork:{}:", artwork_id)
    }

    fn by_owner_prefix(owner_id: &str) -> String {
        format!("finding_by_owner:{}:", owner_id)
    }

    /// Put raw bytes into RocksDB, mapping errors to ArtwatchError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), ArtwatchError> {
        self.db
            .put(key, value)
            .map_err(|e| ArtwatchError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Get raw bytes from RocksDB, mapping errors to ArtwatchError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ArtwatchError> {
        self.db
            .get(key)
            .map_err(|e| ArtwatchError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Collect the key suffixes (after `prefix`) of every key under `prefix`.
    fn suffixes_under(&self, prefix: &str) -> Result<Vec<String>, ArtwatchError> {
        let prefix = prefix.as_bytes();
        let mut suffixes = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, _value) = item
                .map_err(|e| ArtwatchError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }

            if let Ok(suffix) = std::str::from_utf8(&key[prefix.len()..]) {
                suffixes.push(suffix.to_string());
            }
        }

        Ok(suffixes)
    }

    /// Store or replace an artwork record.
    pub fn save_artwork(&self, artwork: &Artwork) -> Result<(), ArtwatchError> {
        let json = serde_json::to_vec(artwork)?;
        self.put_raw(&Self::artwork_key(&artwork.id), &json)
    }

    fn get_artwork_sync(&self, id: &str) -> Result<Option<Artwork>, ArtwatchError> {
        match self.get_raw(&Self::artwork_key(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_finding_sync(&self, id: &str) -> Result<Option<Finding>, ArtwatchError> {
        match self.get_raw(&Self::finding_key(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The record and index writes for one finding, applied together.
    fn finding_batch(artwork: &Artwork, finding: &Finding) -> Result<WriteBatch, ArtwatchError> {
        let json = serde_json::to_vec(finding)?;
        let by_artwork = format!("{}{}", Self::by_artwork_prefix(&artwork.id), finding.id);
        let by_owner = format!("{}{}", Self::by_owner_prefix(&artwork.owner_id), finding.id);

        let mut batch = WriteBatch::default();
        batch.put(Self::finding_key(&finding.id), json);
        // Secondary indexes (empty value; existence is the signal).
        batch.put(by_artwork.as_bytes(), b"");
        batch.put(by_owner.as_bytes(), b"");
        Ok(batch)
    }

    /// Load every finding indexed under `prefix`, ordered by detection time.
    fn findings_under(&self, prefix: &str) -> Result<Vec<Finding>, ArtwatchError> {
        let mut findings = Vec::new();
        for finding_id in self.suffixes_under(prefix)? {
            if let Some(finding) = self.get_finding_sync(&finding_id)? {
                findings.push(finding);
            }
        }
        findings.sort_by(|a, b| a.detected_at.cmp(&b.detected_at).then_with(|| a.id.cmp(&b.id)));
        Ok(findings)
    }
}

#[async_trait]
impl ArtworkStore for RocksStore {
    async fn list_artworks(&self) -> Result<Vec<Artwork>, ArtwatchError> {
        let mut artworks = Vec::new();
        for item in self.db.prefix_iterator(ARTWORK_PREFIX.as_bytes()) {
            let (key, value) = item
                .map_err(|e| ArtwatchError::Storage(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(ARTWORK_PREFIX.as_bytes()) {
                break;
            }
            artworks.push(serde_json::from_slice(&value)?);
        }
        Ok(artworks)
    }

    async fn get_artwork(&self, id: &str) -> Result<Artwork, ArtwatchError> {
        self.get_artwork_sync(id)?
            .ok_or_else(|| ArtwatchError::NotFound(format!("artwork {}", id)))
    }

    async fn save_finding(&self, finding: &Finding) -> Result<(), ArtwatchError> {
        let artwork = self
            .get_artwork_sync(&finding.original_artwork_id)?
            .ok_or_else(|| {
                ArtwatchError::NotFound(format!("artwork {}", finding.original_artwork_id))
            })?;

        let batch = Self::finding_batch(&artwork, finding)?;
        self.db
            .write(batch)
            .map_err(|e| ArtwatchError::Storage(format!("RocksDB batch write failed: {}", e)))
    }

    async fn findings_by_artwork(&self, artwork_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        self.findings_under(&Self::by_artwork_prefix(artwork_id))
    }

    async fn findings_by_owner(&self, owner_id: &str) -> Result<Vec<Finding>, ArtwatchError> {
        self.findings_under(&Self::by_owner_prefix(owner_id))
    }

    async fn update_finding_status(
        &self,
        finding_id: &str,
        status: FindingStatus,
    ) -> Result<(), ArtwatchError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| ArtwatchError::Storage(format!("Mutex poisoned: {}", e)))?;

        let mut finding = self
            .get_finding_sync(finding_id)?
            .ok_or_else(|| ArtwatchError::NotFound(format!("finding {}", finding_id)))?;

        if finding.status == status {
            return Ok(());
        }

        finding.status = status;
        let json = serde_json::to_vec(&finding)?;
        self.put_raw(&Self::finding_key(finding_id), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temporary directory path using UUID to avoid conflicts.
    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("artwatch_test_{}_{}", label, Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn artworks_round_trip_and_missing_is_not_found() {
        let store = RocksStore::open(&temp_db_path("artworks")).unwrap();
        store.save_artwork(&Artwork::new("a1", "alice", "QmA")).unwrap();
        store.save_artwork(&Artwork::new("a2", "bob", "QmB")).unwrap();

        let all = store.list_artworks().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.get_artwork("a2").await.unwrap().owner_id, "bob");
        assert!(store.get_artwork("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn findings_are_indexed_by_artwork_and_owner() {
        let store = RocksStore::open(&temp_db_path("findings")).unwrap();
        store.save_artwork(&Artwork::new("art-1", "alice", "QmA")).unwrap();
        store.save_artwork(&Artwork::new("art-10", "alice", "QmB")).unwrap();
        store.save_artwork(&Artwork::new("art-2", "bob", "QmC")).unwrap();

        let f1 = Finding::new("art-1", "https://x/1.png", 2, true);
        let f2 = Finding::new("art-10", "https://x/2.png", 0, false);
        let f3 = Finding::new("art-2", "https://x/3.png", 10, false);
        for f in [&f1, &f2, &f3] {
            store.save_finding(f).await.unwrap();
        }

        let by_art = store.findings_by_artwork("art-1").await.unwrap();
        assert_eq!(by_art, vec![f1.clone()]);

        let alice = store.findings_by_owner("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].id, f1.id);
        assert_eq!(alice[1].id, f2.id);

        assert_eq!(store.findings_by_owner("bob").await.unwrap().len(), 1);
        assert!(store.findings_by_owner("carol").await.unwrap().is_empty());
    }

    #[test]
    fn finding_record_and_indexes_share_one_batch() {
        let artwork = Artwork::new("art-1", "alice", "QmA");
        let f = Finding::new("art-1", "https://x/1.png", 2, true);
        let batch = RocksStore::finding_batch(&artwork, &f).unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[tokio::test]
    async fn concurrent_saves_never_leave_dangling_index_entries() {
        let store = std::sync::Arc::new(RocksStore::open(&temp_db_path("batch")).unwrap());
        store.save_artwork(&Artwork::new("art-1", "alice", "QmA")).unwrap();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let writer = store.clone();
            tasks.push(tokio::spawn(async move {
                let f = Finding::new("art-1", &format!("https://x/{}.png", i), i % 8, false);
                writer.save_finding(&f).await.unwrap();
            }));
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                for id in store.suffixes_under("finding_by_owner:alice:").unwrap() {
                    assert!(store.get_finding_sync(&id).unwrap().is_some(), "dangling index {}", id);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.findings_by_artwork("art-1").await.unwrap().len(), 32);
        assert_eq!(store.findings_by_owner("alice").await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn finding_for_unknown_artwork_is_rejected() {
        let store = RocksStore::open(&temp_db_path("orphan")).unwrap();
        let f = Finding::new("ghost", "https://x/1.png", 1, true);
        assert!(store.save_finding(&f).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn status_update_is_idempotent_and_checks_existence() {
        let store = RocksStore::open(&temp_db_path("status")).unwrap();
        store.save_artwork(&Artwork::new("a1", "alice", "QmA")).unwrap();
        let f = Finding::new("a1", "https://x/1.png", 3, true);
        store.save_finding(&f).await.unwrap();

        store.update_finding_status(&f.id, FindingStatus::Verified).await.unwrap();
        store.update_finding_status(&f.id, FindingStatus::Verified).await.unwrap();
        let stored = store.findings_by_artwork("a1").await.unwrap();
        assert_eq!(stored[0].status, FindingStatus::Verified);
        assert_eq!(stored[0].detected_at, f.detected_at);

        let err = store
            .update_finding_status("missing", FindingStatus::Read)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
