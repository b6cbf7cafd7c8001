//! Virtual node tree and HTML serialization

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::value::{Handler, Value};

// =============================================================================
// Node
// =============================================================================

/// A concrete node in the rendered tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Serialize the tree to HTML. Listeners are not representable and are
    /// dropped; text is escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text(s) => out.push_str(&escape_text(s)),
            Node::Comment(s) => {
                let _ = write!(out, "<!--{}-->", s.replace("--", "- -"));
            }
        }
    }
}

// =============================================================================
// Element
// =============================================================================

/// An element node: tag, merged style map, boolean attributes, plain
/// properties, event listeners, and ordered children.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub styles: BTreeMap<String, String>,
    pub bool_attrs: BTreeSet<String>,
    pub props: BTreeMap<String, Value>,
    pub listeners: BTreeMap<String, Handler>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Look up a registered listener by event name (`"click"`).
    pub fn listener(&self, event: &str) -> Option<&Handler> {
        self.listeners.get(event)
    }

    /// Depth-first search for the first descendant element with `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.find(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendant elements with `tag`, in document order.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    out.push(el);
                }
                el.find_all(tag, out);
            }
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(s) => out.push_str(s),
                Node::Element(el) => el.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);

        for (name, value) in &self.props {
            let attr = match name.as_str() {
                "className" => "class",
                "htmlFor" => "for",
                other => other,
            };
            match value {
                Value::Str(s) => {
                    let _ = write!(out, " {}=\"{}\"", attr, escape_attr(s));
                }
                Value::Bool(b) => {
                    let _ = write!(out, " {}=\"{}\"", attr, b);
                }
                Value::Int(i) => {
                    let _ = write!(out, " {}=\"{}\"", attr, i);
                }
                Value::Float(x) => {
                    let _ = write!(out, " {}=\"{}\"", attr, x);
                }
                // Maps, lists, handlers and nodes have no attribute form
                _ => {}
            }
        }

        for name in &self.bool_attrs {
            let _ = write!(out, " {}", name);
        }

        if !self.styles.is_empty() {
            out.push_str(" style=\"");
            let mut first = true;
            for (k, v) in &self.styles {
                if !first {
                    out.push_str("; ");
                }
                let _ = write!(out, "{}: {}", k, escape_attr(v));
                first = false;
            }
            out.push('"');
        }

        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
