//! Dynamic value model for props and children
//!
//! Props in the original UI are untyped maps whose values range over
//! primitives, nested style maps, event callbacks, and prebuilt nodes.
//! `Value` carries all of those through one type so the builder can apply
//! its dispatch rules uniformly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::node::Node;

// =============================================================================
// Handler
// =============================================================================

/// A cloneable event callback.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn() + Send + Sync>);

impl Handler {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn invoke(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<handler>")
    }
}

// =============================================================================
// Value
// =============================================================================

/// A dynamically-typed prop or child value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Handler(Handler),
    Node(Node),
}

impl Value {
    /// Truthiness for boolean-attribute props.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Handler(_) | Value::Node(_) => true,
        }
    }

    /// Short human-readable description, used in error messages and when a
    /// stray value is wrapped as a comment node.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => format!("[list of {}]", items.len()),
            Value::Map(entries) => format!("{{map of {}}}", entries.len()),
            Value::Handler(_) => "<handler>".to_string(),
            Value::Node(_) => "<node>".to_string(),
        }
    }

    /// One-word type name for constraint errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Handler(_) => "handler",
            Value::Node(_) => "node",
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(v)
    }
}

impl From<Handler> for Value {
    fn from(v: Handler) -> Self {
        Value::Handler(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Build a `Value::Map` from string keys and values.
pub fn map<K, V, I>(entries: I) -> Value
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(Value::Handler(Handler::new(|| {})).is_truthy());
    }

    #[test]
    fn test_handler_invoke() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let hits = Arc::new(AtomicUsize::new(0));
        let h = {
            let hits = hits.clone();
            Handler::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        h.invoke();
        h.clone().invoke();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
