//! # Content Nodes
//!
//! A node is one element of the document: a chapter, a paragraph, an image.
//! Nodes never own each other. Every node lives in the [`Tree`](crate::Tree)
//! arena and refers to its children and its parent by identity only.

use crate::errors::{TreeError, TreeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Opaque node identity, unique within one tree
pub type NodeId = String;

/// Type-specific attribute bag (`name`, `content`, `url`, ...)
pub type Attributes = serde_json::Map<String, Value>;

/// Pseudo-identity addressing the tree's own top-level child list
pub const ROOT_KEY: &str = "root";

/// Keys that describe structure and can never be set as attributes
pub const RESERVED_KEYS: [&str; 2] = ["type", "children"];

/// Address of a child container: either the root or a regular node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKey {
    Root,
    Node(NodeId),
}

impl NodeKey {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeKey::Root)
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKey::Root => ROOT_KEY,
            NodeKey::Node(id) => id,
        }
    }

    /// The node id, or `None` for the root sentinel
    pub fn node_id(&self) -> Option<&str> {
        match self {
            NodeKey::Root => None,
            NodeKey::Node(id) => Some(id),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        if s == ROOT_KEY {
            NodeKey::Root
        } else {
            NodeKey::Node(s.to_string())
        }
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        if s == ROOT_KEY {
            NodeKey::Root
        } else {
            NodeKey::Node(s)
        }
    }
}

impl From<NodeKey> for String {
    fn from(key: NodeKey) -> Self {
        match key {
            NodeKey::Root => ROOT_KEY.to_string(),
            NodeKey::Node(id) => id,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a reference sibling to insert on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Before,
    After,
}

impl FromStr for Position {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(TreeError::Payload(format!("unknown position: {}", other))),
        }
    }
}

/// Where to put a child inside an ordered child list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// At the end of the list
    Append,
    /// Immediately before the given sibling
    Before(NodeId),
    /// Immediately after the given sibling
    After(NodeId),
}

impl Placement {
    pub fn relative(reference: impl Into<NodeId>, position: Position) -> Self {
        match position {
            Position::Before => Placement::Before(reference.into()),
            Position::After => Placement::After(reference.into()),
        }
    }
}

/// Ordered child identities of a node or of the root.
///
/// Order is reading order. The list only stores ids; keeping parent
/// back-references in sync is the tree's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Children(Vec<NodeId>);

impl Children {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert `id` according to `placement`.
    ///
    /// Fails with `InvalidReference` if the placement names a sibling that
    /// is not in this list. Nothing is inserted in that case.
    pub fn insert(&mut self, id: NodeId, placement: &Placement) -> TreeResult<()> {
        let index = self.index_for(placement)?;
        self.0.insert(index, id);
        Ok(())
    }

    /// Index at which `placement` would insert, without inserting
    pub fn index_for(&self, placement: &Placement) -> TreeResult<usize> {
        match placement {
            Placement::Append => Ok(self.0.len()),
            Placement::Before(reference) => self
                .position(reference)
                .ok_or_else(|| TreeError::InvalidReference(reference.clone())),
            Placement::After(reference) => self
                .position(reference)
                .map(|i| i + 1)
                .ok_or_else(|| TreeError::InvalidReference(reference.clone())),
        }
    }

    /// Remove `id`. Returns `false` (and changes nothing) when it is absent.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|c| c == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<NodeId>> for Children {
    fn from(ids: Vec<NodeId>) -> Self {
        Self(ids)
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single content element
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    node_type: String,
    attributes: Attributes,
    children: Children,
    /// `None` only while the node is not attached anywhere
    parent: Option<NodeKey>,
}

impl Node {
    /// Construct a detached node
    /// Build a detached node. Reserved keys (`type`, `children`) in
    /// `attributes` are dropped.
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>, mut attributes: Attributes) -> Self {
        let id = id.into();
        for key in RESERVED_KEYS {
            if attributes.remove(key).is_some() {
                warn!(node_id = %id, key, "Ignoring reserved attribute key");
            }
        }
        Self {
            id,
            node_type: node_type.into(),
            attributes,
            children: Children::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::Node(self.id.clone())
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn parent(&self) -> Option<&NodeKey> {
        self.parent.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Put `child` into this node's child list.
    ///
    /// Only the list is touched. The caller must detach `child` from any
    /// previous parent first and record the new parent on the child;
    /// [`Tree::attach`](crate::Tree::attach) does both.
    pub fn add_child(&mut self, child: NodeId, placement: &Placement) -> TreeResult<()> {
        self.children.insert(child, placement)
    }

    /// Drop `id` from the child list. Absent ids are ignored.
    pub fn remove_child(&mut self, id: &str) -> bool {
        self.children.remove(id)
    }

    /// Merge a partial attribute set by key. Unmentioned keys are untouched.
    pub fn merge_attributes(&mut self, attrs: &Attributes) {
        for (key, value) in attrs {
            if RESERVED_KEYS.contains(&key.as_str()) {
                warn!(node_id = %self.id, key = %key, "Ignoring reserved attribute key");
                continue;
            }
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    pub(crate) fn set_children(&mut self, children: Children) {
        self.children = children;
    }
}
