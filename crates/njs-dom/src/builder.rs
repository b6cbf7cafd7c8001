//! Element construction
//!
//! `build` is the single entry point: a type (tag or component), a prop
//! value that must be null or a map, and variadic, arbitrarily nested
//! children. Prop handling is an ordered rule table evaluated top to
//! bottom, so the duck-typed dispatch of the original is explicit and
//! testable in isolation.

use std::collections::BTreeMap;

use crate::node::{Element, Node};
use crate::value::Value;

// =============================================================================
// Errors
// =============================================================================

/// Constraint violations in `build` calls. These are programming errors,
/// not runtime conditions: callers are expected to propagate them, never
/// to recover.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("element type must be a tag or a component, got: {0}")]
    TypeConstraint(String),
    #[error("props must be null or a map, got {kind}: {shown}")]
    ShapeConstraint { kind: &'static str, shown: String },
}

// =============================================================================
// Element Type
// =============================================================================

/// A component function: invoked with its props map (including a
/// `children` entry holding the flattened child nodes) and returns
/// whatever node it produces.
pub type Component = fn(Value) -> Result<Node, DomError>;

/// What `build` constructs: a concrete tag or a callable component.
#[derive(Clone)]
pub enum ElemType {
    Tag(String),
    Component(Component),
}

impl From<&str> for ElemType {
    fn from(tag: &str) -> Self {
        ElemType::Tag(tag.to_string())
    }
}

#[inline]
fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

// =============================================================================
// Build
// =============================================================================

/// Build a node from a type, props, and nested children.
///
/// Children are flattened in order; existing nodes pass through, non-null
/// primitives become text nodes, and anything else becomes a comment node
/// so rendering never fails on an unexpected leaf shape.
pub fn build(
    elem_type: ElemType,
    props: Value,
    children: Vec<Value>,
) -> Result<Node, DomError> {
    let prop_map = match props {
        Value::Null => BTreeMap::new(),
        Value::Map(entries) => entries,
        other => {
            return Err(DomError::ShapeConstraint {
                kind: other.kind(),
                shown: other.describe(),
            })
        }
    };

    let mut flat = Vec::new();
    flatten_children(children, &mut flat);

    match elem_type {
        ElemType::Component(component) => {
            let mut merged = prop_map;
            merged.insert(
                "children".to_string(),
                Value::List(flat.into_iter().map(Value::Node).collect()),
            );
            component(Value::Map(merged))
        }
        ElemType::Tag(tag) => {
            if !is_valid_tag(&tag) {
                return Err(DomError::TypeConstraint(tag));
            }
            let mut elem = Element::new(tag);
            for (name, value) in prop_map {
                apply_prop(&mut elem, &name, value);
            }
            elem.children = flat;
            Ok(Node::Element(elem))
        }
    }
}

/// Shorthand for building a tag element, mirroring the original `h`.
pub fn h(tag: &str, props: Value, children: Vec<Value>) -> Result<Node, DomError> {
    build(ElemType::from(tag), props, children)
}

fn flatten_children(children: Vec<Value>, out: &mut Vec<Node>) {
    for child in children {
        match child {
            Value::List(nested) => flatten_children(nested, out),
            other => out.push(to_node(other)),
        }
    }
}

fn to_node(value: Value) -> Node {
    match value {
        Value::Node(node) => node,
        Value::Bool(b) => Node::Text(b.to_string()),
        Value::Int(i) => Node::Text(i.to_string()),
        Value::Float(x) => Node::Text(x.to_string()),
        Value::Str(s) => Node::Text(s),
        // Null-ish sentinels and complex values become comments, not errors
        other => Node::Comment(other.describe()),
    }
}

// =============================================================================
// Property Dispatch Table
// =============================================================================

type PropPredicate = fn(&str, &Value) -> bool;
type PropAction = fn(&mut Element, &str, Value);

/// Ordered (predicate, action) pairs, evaluated top to bottom. First match
/// wins; the final rule always matches.
const PROP_RULES: &[(PropPredicate, PropAction)] = &[
    (is_style_prop, apply_style),
    (is_boolean_attr_prop, apply_boolean_attr),
    (is_event_prop, apply_event),
    (any_prop, apply_plain),
];

fn any_prop(_name: &str, _value: &Value) -> bool {
    true
}

fn apply_prop(elem: &mut Element, name: &str, value: Value) {
    for (predicate, action) in PROP_RULES {
        if predicate(name, &value) {
            action(elem, name, value);
            return;
        }
    }
}

fn is_style_prop(name: &str, _value: &Value) -> bool {
    name == "style"
}

/// Shallow-merge a style map onto the element's style map. Non-map style
/// values have nothing to merge and are dropped.
fn apply_style(elem: &mut Element, _name: &str, value: Value) {
    if let Value::Map(entries) = value {
        for (k, v) in entries {
            elem.styles.insert(k, v.describe());
        }
    }
}

fn is_boolean_attr_prop(name: &str, _value: &Value) -> bool {
    matches!(
        name,
        "aria-current" | "aria-pressed" | "autofocus" | "checked" | "disabled"
    )
}

/// Boolean attributes are present/absent, never stringified.
fn apply_boolean_attr(elem: &mut Element, name: &str, value: Value) {
    if value.is_truthy() {
        elem.bool_attrs.insert(name.to_string());
    }
}

/// `on<Name>` with a handler value. A name matching the convention but
/// carrying a non-handler value falls through to the plain-property rule.
fn is_event_prop(name: &str, value: &Value) -> bool {
    matches!(value, Value::Handler(_))
        && name.len() > 2
        && name.starts_with("on")
        && name.as_bytes()[2].is_ascii_alphabetic()
}

fn apply_event(elem: &mut Element, name: &str, value: Value) {
    if let Value::Handler(handler) = value {
        elem.listeners.insert(name[2..].to_ascii_lowercase(), handler);
    }
}

fn apply_plain(elem: &mut Element, name: &str, value: Value) {
    elem.props.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{map, Handler};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tag_of(node: &Node) -> &str {
        &node.as_element().unwrap().tag
    }

    #[test]
    fn test_nested_children_flatten_in_order() {
        // build('div', {className:'x'}, 'a', ['b', build('span', null)])
        let span = h("span", Value::Null, vec![]).unwrap();
        let node = h(
            "div",
            map([("className", "x")]),
            vec!["a".into(), Value::List(vec!["b".into(), span.into()])],
        )
        .unwrap();

        let el = node.as_element().unwrap();
        assert!(matches!(el.props.get("className"), Some(Value::Str(s)) if s == "x"));
        assert_eq!(el.children.len(), 3);
        assert_eq!(el.children[0].as_text(), Some("a"));
        assert_eq!(el.children[1].as_text(), Some("b"));
        assert_eq!(tag_of(&el.children[2]), "span");
    }

    #[test]
    fn test_bad_props_shape_fails() {
        let err = h("div", Value::Str("nope".into()), vec![]).unwrap_err();
        assert!(matches!(err, DomError::ShapeConstraint { kind: "string", .. }));
    }

    #[test]
    fn test_bad_tag_fails() {
        let err = h("", Value::Null, vec![]).unwrap_err();
        assert!(matches!(err, DomError::TypeConstraint(_)));
        let err = h("no spaces", Value::Null, vec![]).unwrap_err();
        assert!(matches!(err, DomError::TypeConstraint(_)));
    }

    #[test]
    fn test_odd_leaves_become_comments() {
        let node = h(
            "div",
            Value::Null,
            vec![Value::Null, map([("k", 1i64)]), Value::Handler(Handler::new(|| {}))],
        )
        .unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.children.len(), 3);
        for child in &el.children {
            assert!(matches!(child, Node::Comment(_)));
        }
    }

    #[test]
    fn test_style_merges_shallow() {
        let node = h(
            "div",
            map([("style", map([("textAlign", "center"), ("color", "red")]))]),
            vec![],
        )
        .unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.styles.get("textAlign").map(String::as_str), Some("center"));
        assert_eq!(el.styles.get("color").map(String::as_str), Some("red"));
        assert!(el.props.get("style").is_none());
    }

    #[test]
    fn test_boolean_attrs_present_or_absent() {
        let node = h(
            "button",
            map([
                ("disabled", Value::Bool(true)),
                ("checked", Value::Bool(false)),
                ("autofocus", Value::Int(1)),
            ]),
            vec![],
        )
        .unwrap();
        let el = node.as_element().unwrap();
        assert!(el.bool_attrs.contains("disabled"));
        assert!(el.bool_attrs.contains("autofocus"));
        assert!(!el.bool_attrs.contains("checked"));
        assert!(el.props.is_empty());
    }

    #[test]
    fn test_event_props_register_listeners() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = {
            let hits = hits.clone();
            Handler::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        let node = h("button", map([("onClick", Value::Handler(handler))]), vec![]).unwrap();
        let el = node.as_element().unwrap();
        assert!(el.props.is_empty());
        el.listener("click").unwrap().invoke();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_name_without_handler_is_plain_prop() {
        let node = h("input", map([("onfail", "just a string")]), vec![]).unwrap();
        let el = node.as_element().unwrap();
        assert!(el.listeners.is_empty());
        assert!(matches!(el.props.get("onfail"), Some(Value::Str(_))));
    }

    #[test]
    fn test_component_receives_children() {
        fn wrapper(props: Value) -> Result<Node, DomError> {
            let Value::Map(mut entries) = props else {
                unreachable!("components always receive a map");
            };
            let children = match entries.remove("children") {
                Some(Value::List(items)) => items,
                _ => vec![],
            };
            h("section", Value::Null, children)
        }

        let node = build(
            ElemType::Component(wrapper),
            map([("title", "x")]),
            vec!["inner".into()],
        )
        .unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.tag, "section");
        assert_eq!(el.children[0].as_text(), Some("inner"));
    }

    #[test]
    fn test_primitive_children_become_text() {
        let node = h("div", Value::Null, vec![Value::Int(42), Value::Bool(true)]).unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.children[0].as_text(), Some("42"));
        assert_eq!(el.children[1].as_text(), Some("true"));
    }
}
