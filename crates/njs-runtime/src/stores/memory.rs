//! In-memory stores
//!
//! Process-local implementations of the store facades. They back the unit
//! tests and the parts of the CLI that do not need persistence, and
//! resolve `get(url)` with the same most-specific-pattern-wins semantics
//! the real content-settings store applies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use njs_core::pattern::{pattern_matches, specificity};
use njs_core::Setting;

use super::{ContentSettingsStore, KeyValueStore, StorageChange, StoreError, TabControl};

// =============================================================================
// Content Settings
// =============================================================================

/// In-memory authoritative store. Rules keep insertion order; `set` on an
/// existing pattern replaces in place (last-write-wins).
#[derive(Default)]
pub struct MemoryContentSettings {
    rules: RwLock<Vec<(String, Setting)>>,
    failing: AtomicBool,
}

impl MemoryContentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, for exercising failure paths.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("injected failure".to_string()));
        }
        Ok(())
    }

    /// Installed setting for an exact pattern, for assertions.
    pub fn rule_for(&self, pattern: &str) -> Option<Setting> {
        self.rules
            .read()
            .unwrap()
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, s)| *s)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.read().unwrap().len()
    }
}

#[async_trait]
impl ContentSettingsStore for MemoryContentSettings {
    async fn get(&self, url: &str) -> Result<Setting, StoreError> {
        self.check()?;
        let rules = self.rules.read().unwrap();
        // Most specific matching pattern wins; later install wins ties
        let mut best: Option<(usize, Setting)> = None;
        for (pattern, setting) in rules.iter() {
            if !pattern_matches(pattern, url) {
                continue;
            }
            let rank = specificity(pattern);
            if best.map_or(true, |(prev, _)| rank >= prev) {
                best = Some((rank, *setting));
            }
        }
        // No matching rule falls through to the default (allow)
        Ok(best.map(|(_, s)| s).unwrap_or_default())
    }

    async fn set(&self, pattern: &str, setting: Setting) -> Result<(), StoreError> {
        self.check()?;
        let mut rules = self.rules.write().unwrap();
        match rules.iter_mut().find(|(p, _)| p == pattern) {
            Some(entry) => entry.1 = setting,
            None => rules.push((pattern.to_string(), setting)),
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.check()?;
        self.rules.write().unwrap().clear();
        Ok(())
    }
}

// =============================================================================
// Key-Value Store
// =============================================================================

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-memory persistence store with broadcast change notifications.
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            changes,
        }
    }
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let old_value = self
            .entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.clone());
        // No subscribers is fine; send only fails then
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let old_value = self.entries.write().unwrap().remove(key);
        if old_value.is_some() {
            let _ = self.changes.send(StorageChange {
                key: key.to_string(),
                old_value,
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

// =============================================================================
// Tab Control
// =============================================================================

/// Records reload requests instead of driving a browser.
#[derive(Default)]
pub struct RecordingTabControl {
    reloads: Mutex<Vec<i32>>,
}

impl RecordingTabControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reloads(&self) -> Vec<i32> {
        self.reloads.lock().unwrap().clone()
    }
}

impl TabControl for RecordingTabControl {
    fn reload(&self, tab_id: i32) {
        log::debug!("reload requested for tab {tab_id}");
        self.reloads.lock().unwrap().push(tab_id);
    }
}
