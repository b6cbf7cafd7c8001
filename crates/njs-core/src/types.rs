//! Shared rule types
//!
//! These types are the unit of exchange between the authoritative
//! content-settings store, the persisted rule cache, and the options UI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage key the rule cache snapshot is persisted under.
pub const SNAPSHOT_KEY: &str = "javascriptContentSettings";

// =============================================================================
// Setting
// =============================================================================

/// Per-pattern script execution setting.
///
/// There is no default/ask variant: a URL without a matching rule falls
/// through to the store's default, which behaves like [`Setting::Allow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Setting {
    #[default]
    Allow,
    Block,
}

impl Setting {
    /// Strict binary flip. Stores resolve an unruled URL to the default
    /// (allow) before this runs, so a fresh page flips to block.
    #[inline]
    pub fn flipped(self) -> Setting {
        match self {
            Setting::Allow => Setting::Block,
            Setting::Block => Setting::Allow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Setting::Allow => "allow",
            Setting::Block => "block",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SiteRule
// =============================================================================

/// A persisted (pattern, setting) pair.
///
/// `pattern` is a glob-style match expression over scheme/host/path,
/// e.g. `*://*.example.com/*`, and is the unique key within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRule {
    pub pattern: String,
    pub setting: Setting,
}

impl SiteRule {
    pub fn new(pattern: impl Into<String>, setting: Setting) -> Self {
        Self {
            pattern: pattern.into(),
            setting,
        }
    }
}
