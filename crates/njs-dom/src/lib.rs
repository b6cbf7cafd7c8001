//! NoJS Element Builder
//!
//! A small declarative UI-construction primitive: build a virtual element
//! tree from a type, a dynamic property map, and arbitrarily nested
//! children. There is no reconciliation or diffing: every render replaces
//! the previous tree wholesale.
//!
//! # Modules
//!
//! - `value`: dynamic prop/child value model (maps, primitives, handlers)
//! - `node`: the element/text/comment tree and its HTML serializer
//! - `builder`: `build` itself plus the ordered property-dispatch table
//! - `surface`: the root container a view owns and fully replaces

pub mod builder;
pub mod node;
pub mod surface;
pub mod value;

// Re-export commonly used items
pub use builder::{build, h, DomError, ElemType};
pub use node::{Element, Node};
pub use surface::Surface;
pub use value::{Handler, Value};
