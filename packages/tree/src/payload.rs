//! # Flat Payload Format
//!
//! The identity-indexed representation a tree is loaded from and saved to:
//!
//! ```json
//! {
//!   "children": ["1", "2"],
//!   "nodeCount": 5,
//!   "nodes": {
//!     "1": { "type": "section", "name": "First Chapter", "children": ["3"] },
//!     "3": { "type": "paragraph", "content": "Your text goes here." }
//!   }
//! }
//! ```
//!
//! Attributes sit next to `type` and `children` in each node record.
//! Top-level keys other than the three above (a document's `title`, its
//! `author`) are carried through untouched in [`TreePayload::extra`].

use crate::node::{Attributes, Node, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Serialized form of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub children: Vec<NodeId>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

impl NodeRecord {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            node_type: node.node_type().to_string(),
            children: node.children().iter().cloned().collect(),
            attributes: node.attributes().clone(),
        }
    }
}

/// Serialized form of a whole tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreePayload {
    #[serde(default)]
    pub children: Vec<NodeId>,

    #[serde(rename = "nodeCount", default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u64>,

    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeRecord>,

    /// Document-level fields stored alongside the tree
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TreePayload {
    /// The stub every new document starts from
    pub fn empty_document() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "1".to_string(),
            NodeRecord::new("section")
                .with_attribute("name", "First Chapter")
                .with_children(["3", "5"]),
        );
        nodes.insert(
            "2".to_string(),
            NodeRecord::new("section")
                .with_attribute("name", "Second Chapter")
                .with_children(["4"]),
        );
        nodes.insert(
            "3".to_string(),
            NodeRecord::new("paragraph").with_attribute("content", "Your text goes here."),
        );
        nodes.insert(
            "4".to_string(),
            NodeRecord::new("image").with_attribute(
                "url",
                "http://tmp.vivian.transloadit.com/scratch/9a65045a69dd88c2baf281c28dbd15a7",
            ),
        );
        nodes.insert(
            "5".to_string(),
            NodeRecord::new("paragraph").with_attribute("content", "Additional text."),
        );

        let mut extra = serde_json::Map::new();
        extra.insert("title".to_string(), Value::from("Untitled"));
        extra.insert("author".to_string(), Value::from("John Doe"));

        Self {
            children: vec!["1".to_string(), "2".to_string()],
            node_count: Some(5),
            nodes,
            extra,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
