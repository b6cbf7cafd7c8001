//! NoJS Core Library
//!
//! Pure, synchronous building blocks for the per-site script toggle:
//! URL slicing, rule pattern derivation, pattern matching, and the
//! shared rule types. No I/O and no async; everything here is
//! deterministic and directly unit-testable.
//!
//! # Modules
//!
//! - `url`: scheme/host extraction without allocations
//! - `pattern`: URL -> rule pattern derivation and pattern matching
//! - `types`: shared rule type definitions

pub mod pattern;
pub mod types;
pub mod url;

// Re-export commonly used items
pub use pattern::{derive, pattern_matches};
pub use types::{Setting, SiteRule, SNAPSHOT_KEY};
pub use url::{host_of, scheme_of};
