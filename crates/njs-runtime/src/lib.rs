//! NoJS Runtime
//!
//! The asynchronous half of the script toggle: facades over the
//! authoritative content-settings store and the persistence store, the
//! mirrored rule cache, the toggle controller, and the reactive options
//! view. All stores are injected trait objects so the whole flow runs
//! against in-memory fakes in tests and against a JSON file in the CLI.
//!
//! # Modules
//!
//! - `stores`: store traits, errors, in-memory fakes, JSON-file store
//! - `cache`: persisted rule snapshot mirror with change notifications
//! - `toggle`: "flip the rule for the current page" orchestration
//! - `view`: reactive rule list rendered through the element builder

pub mod cache;
pub mod stores;
pub mod toggle;
pub mod view;

// Re-export commonly used items
pub use cache::{RuleCache, SnapshotChanges};
pub use stores::{
    ContentSettingsStore, KeyValueStore, StorageChange, StoreError, Tab, TabControl,
};
pub use toggle::ToggleController;
pub use view::{OptionsView, ViewError, ViewMsg};
