//! Render surface
//!
//! The single root container a view owns. Each render fully replaces the
//! previous tree; there is no diffing.

use crate::node::{Element, Node};

/// Root container node. Prior content is discarded on every `replace`.
#[derive(Debug, Default)]
pub struct Surface {
    tree: Option<Node>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous tree and attach `tree` (or nothing).
    pub fn replace(&mut self, tree: Option<Node>) {
        self.tree = tree;
    }

    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    pub fn root_element(&self) -> Option<&Element> {
        self.tree.as_ref().and_then(Node::as_element)
    }

    pub fn to_html(&self) -> String {
        match &self.tree {
            Some(node) => node.to_html(),
            None => String::new(),
        }
    }
}
