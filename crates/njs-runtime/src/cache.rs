//! Rule cache
//!
//! Persisted mirror of all known rules. The authoritative store cannot be
//! enumerated, so every rule it holds is also written here, as one ordered
//! sequence under a single storage key.

use std::sync::Arc;

use tokio::sync::broadcast;

use njs_core::{SiteRule, SNAPSHOT_KEY};

use crate::stores::{KeyValueStore, StorageChange, StoreError};

/// Mirror of the (pattern, setting) pairs installed in the authoritative
/// store, persisted as one JSON sequence.
pub struct RuleCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl RuleCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SNAPSHOT_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted snapshot. An absent value and a malformed value
    /// both coerce to an empty sequence; the first run and a corrupted
    /// store look the same to readers.
    pub async fn load_snapshot(&self) -> Result<Vec<SiteRule>, StoreError> {
        let raw = self.store.get(&self.key).await?;
        Ok(Self::decode(raw.as_ref()))
    }

    /// Replace-or-append keyed by pattern, preserving the position of a
    /// replaced entry, then persist the whole snapshot.
    ///
    /// This is a plain read-modify-write with no serialization against
    /// concurrent callers: two racing upserts can lose the slower
    /// reader's view of the faster writer's entry. Known property of the
    /// design, kept as-is.
    pub async fn upsert(&self, rule: SiteRule) -> Result<Vec<SiteRule>, StoreError> {
        let mut rules = self.load_snapshot().await?;
        match rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        self.store
            .set(&self.key, serde_json::to_value(&rules)?)
            .await?;
        Ok(rules)
    }

    /// Remove the snapshot key entirely. Distinct from persisting an empty
    /// sequence, though readers treat both as "no rules".
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key).await
    }

    /// Subscribe to snapshot changes, delivered as decoded rule sequences
    /// (empty on removal or malformed writes).
    pub fn changes(&self) -> SnapshotChanges {
        SnapshotChanges {
            rx: self.store.subscribe(),
            key: self.key.clone(),
        }
    }

    fn decode(raw: Option<&serde_json::Value>) -> Vec<SiteRule> {
        match raw {
            None => Vec::new(),
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(rules) => rules,
                Err(e) => {
                    log::warn!("discarding malformed rule snapshot: {e}");
                    Vec::new()
                }
            },
        }
    }
}

/// Change subscription filtered to the cache's storage key.
pub struct SnapshotChanges {
    rx: broadcast::Receiver<StorageChange>,
    key: String,
}

impl SnapshotChanges {
    /// Next snapshot for the cache key, or `None` once the store side of
    /// the channel is gone. Changes to other keys are skipped; lagged
    /// notifications are dropped in favor of newer ones.
    pub async fn next(&mut self) -> Option<Vec<SiteRule>> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == self.key => {
                    return Some(RuleCache::decode(change.new_value.as_ref()));
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryKeyValueStore;
    use njs_core::Setting;
    use serde_json::json;

    fn cache() -> (Arc<MemoryKeyValueStore>, RuleCache) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cache = RuleCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_absent_snapshot_is_empty() {
        let (_, cache) = cache();
        assert!(cache.load_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_coerces_to_empty() {
        let (store, cache) = cache();
        store.set(SNAPSHOT_KEY, json!("not a sequence")).await.unwrap();
        assert!(cache.load_snapshot().await.unwrap().is_empty());

        store.set(SNAPSHOT_KEY, json!({"still": "wrong"})).await.unwrap();
        assert!(cache.load_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_appends_then_replaces_in_place() {
        let (_, cache) = cache();
        let a = SiteRule::new("*://*.a.com/*", Setting::Block);
        let b = SiteRule::new("*://*.b.com/*", Setting::Block);

        cache.upsert(a.clone()).await.unwrap();
        let rules = cache.upsert(b.clone()).await.unwrap();
        assert_eq!(rules, vec![a.clone(), b.clone()]);

        // Replacing the first entry keeps its position
        let a2 = SiteRule::new("*://*.a.com/*", Setting::Allow);
        let rules = cache.upsert(a2.clone()).await.unwrap();
        assert_eq!(rules, vec![a2, b]);
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let (store, cache) = cache();
        cache
            .upsert(SiteRule::new("*://*.a.com/*", Setting::Block))
            .await
            .unwrap();
        cache.clear().await.unwrap();
        assert_eq!(store.get(SNAPSHOT_KEY).await.unwrap(), None);
        assert!(cache.load_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_filtered_and_decoded() {
        let (store, cache) = cache();
        let mut changes = cache.changes();

        // Unrelated key is skipped
        store.set("other", json!(1)).await.unwrap();
        let rule = SiteRule::new("*://*.a.com/*", Setting::Block);
        cache.upsert(rule.clone()).await.unwrap();
        assert_eq!(changes.next().await.unwrap(), vec![rule]);

        cache.clear().await.unwrap();
        assert!(changes.next().await.unwrap().is_empty());
    }
}
