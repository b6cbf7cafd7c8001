//! Store facades
//!
//! Async trait facades over the two external stores the toggle core talks
//! to: the authoritative per-pattern content-settings store (source of
//! truth, not enumerable) and the key-value persistence store that backs
//! the rule cache. Both are injected as trait objects; the reference flow
//! ignores failures, but every call still returns a `Result` at the
//! boundary so tests can inject them.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use njs_core::Setting;

// =============================================================================
// Errors
// =============================================================================

/// Failure of an external store call. The core has no retry or recovery
/// path for these; callers propagate them as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("store rejected the operation: {0}")]
    Rejected(String),
}

// =============================================================================
// Change Notifications
// =============================================================================

/// Emitted by the persistence store after every successful `set`/`remove`.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

// =============================================================================
// Store Traits
// =============================================================================

/// The authoritative per-pattern script permission store.
///
/// It resolves which installed pattern, if any, matches a concrete URL;
/// it cannot be enumerated, which is why the rule cache exists at all.
#[async_trait]
pub trait ContentSettingsStore: Send + Sync {
    /// Effective setting for a concrete URL. A URL no installed rule
    /// matches resolves to the store default, [`Setting::Allow`].
    async fn get(&self, url: &str) -> Result<Setting, StoreError>;

    /// Install or replace the rule for `pattern`. Last write wins.
    async fn set(&self, pattern: &str, setting: Setting) -> Result<(), StoreError>;

    /// Remove every installed rule.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

/// The key-value persistence store backing the rule cache.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Subscribe to change notifications for all keys.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

// =============================================================================
// Browsing Surface
// =============================================================================

/// The active page a toggle was invoked on: its URL plus an opaque
/// identifier the browsing surface understands.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: i32,
    pub url: String,
}

/// Fire-and-forget page reload command. No completion is awaited.
pub trait TabControl: Send + Sync {
    fn reload(&self, tab_id: i32);
}
