// crates/artwatch-crawler/src/notifications.rs
//
// In-memory per-owner notification cache.
//
// Holds the findings detected since process start (or since the owner's last
// clear). It is a view, not a source of truth: status changes made through the
// crawler are mirrored here in place, so unread counts track the store.

use std::collections::HashMap;

use tokio::sync::RwLock;

use artwatch_core::{Finding, FindingStatus};

#[derive(Default)]
struct Inner {
    by_owner: HashMap<String, Vec<Finding>>,
    /// finding id -> owner id, for in-place status updates.
    owner_of: HashMap<String, String>,
}

/// Per-owner list of live findings, safe for concurrent use.
#[derive(Default)]
pub struct NotificationCache {
    inner: RwLock<Inner>,
}

impl NotificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding to `owner_id`'s list.
    pub async fn add(&self, owner_id: &str, finding: Finding) {
        let mut inner = self.inner.write().await;
        inner
            .owner_of
            .insert(finding.id.clone(), owner_id.to_string());
        inner
            .by_owner
            .entry(owner_id.to_string())
            .or_default()
            .push(finding);
    }

    /// Snapshot of `owner_id`'s findings in insertion order. Empty if none.
    pub async fn notifications(&self, owner_id: &str) -> Vec<Finding> {
        let inner = self.inner.read().await;
        inner.by_owner.get(owner_id).cloned().unwrap_or_default()
    }

    /// Number of `owner_id`'s cached findings still pending.
    pub async fn unread_count(&self, owner_id: &str) -> usize {
        let inner = self.inner.read().await;
        inner
            .by_owner
            .get(owner_id)
            .map(|list| list.iter().filter(|f| f.is_unread()).count())
            .unwrap_or(0)
    }

    /// Drop every cached finding for `owner_id`. Other owners are untouched.
    pub async fn clear(&self, owner_id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(list) = inner.by_owner.remove(owner_id) {
            for finding in list {
                inner.owner_of.remove(&finding.id);
            }
        }
    }

    /// Mirror a status change onto the cached entry, if present.
    /// Returns whether an entry was updated.
    pub async fn set_status(&self, finding_id: &str, status: FindingStatus) -> bool {
        let mut inner = self.inner.write().await;
        let owner = match inner.owner_of.get(finding_id) {
            Some(owner) => owner.clone(),
            None => return false,
        };

        match inner
            .by_owner
            .get_mut(&owner)
            .and_then(|list| list.iter_mut().find(|f| f.id == finding_id))
        {
            Some(finding) => {
                finding.status = status;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_snapshot_in_order() {
        let cache = NotificationCache::new();
        let a = Finding::new("art-1", "https://a.example/1.png", 0, false);
        let b = Finding::new("art-1", "https://a.example/2.png", 3, true);
        cache.add("alice", a.clone()).await;
        cache.add("alice", b.clone()).await;

        let list = cache.notifications("alice").await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
        assert!(cache.notifications("bob").await.is_empty());
    }

    #[tokio::test]
    async fn unread_count_follows_status() {
        let cache = NotificationCache::new();
        let a = Finding::new("art-1", "https://a.example/1.png", 0, false);
        let b = Finding::new("art-1", "https://a.example/2.png", 1, true);
        let c = Finding::new("art-1", "https://a.example/3.png", 2, true);
        for f in [&a, &b, &c] {
            cache.add("alice", f.clone()).await;
        }
        assert_eq!(cache.unread_count("alice").await, 3);

        assert!(cache.set_status(&b.id, FindingStatus::Read).await);
        assert!(cache.set_status(&c.id, FindingStatus::Dismissed).await);
        assert_eq!(cache.unread_count("alice").await, 1);

        assert!(!cache.set_status("missing", FindingStatus::Read).await);
    }

    #[tokio::test]
    async fn clear_only_touches_one_owner() {
        let cache = NotificationCache::new();
        let a = Finding::new("art-1", "https://a.example/1.png", 0, false);
        let b = Finding::new("art-2", "https://b.example/1.png", 0, false);
        cache.add("alice", a.clone()).await;
        cache.add("bob", b).await;

        cache.clear("alice").await;
        assert!(cache.notifications("alice").await.is_empty());
        assert_eq!(cache.unread_count("bob").await, 1);
        assert!(!cache.set_status(&a.id, FindingStatus::Read).await);

        // Clearing an unknown owner is a no-op.
        cache.clear("carol").await;
    }
}
