//! # Editing Intents
//!
//! Serializable form of the operations a [`Document`](crate::Document)
//! accepts, so edit scripts can be stored, sent, and replayed.
//!
//! ## Mutation Semantics
//!
//! ### Create
//! - New node gets a fresh id and the catalog defaults for its type
//! - Parent gets one `change:node`, then the new node is selected
//!
//! ### Move
//! - Relocates a node next to a target, under the target's parent
//! - Moving a node onto itself is a no-op
//! - Fails without side effects if it would put a node inside itself
//!
//! ### Remove
//! - Detaches the node; whether its subtree is purged is configuration
//!
//! ### Update
//! - Merges attributes by key, last write wins

use folio_tree::{Attributes, NodeId, Position};
use serde::{Deserialize, Serialize};

/// Editing intents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Append a new node to a parent (`"root"` for top level)
    CreateChild { node_type: String, parent_id: String },

    /// Insert a new node right after a sibling
    CreateSiblingAfter { node_type: String, predecessor_id: String },

    /// Insert a new node right before a sibling
    CreateSiblingBefore { node_type: String, successor_id: String },

    /// Move a node next to a target node
    MoveNode {
        source_id: String,
        target_id: String,
        position: Position,
    },

    /// Detach a node from its parent
    RemoveNode { node_id: String },

    /// Merge attributes into a node
    UpdateNode {
        node_id: String,
        attributes: Attributes,
    },

    /// Merge attributes into the selected node and publish it
    UpdateSelectedNode {
        attributes: Attributes,
        #[serde(default)]
        notify: bool,
    },

    /// Change the selection
    SelectNode { node_id: String },
}

impl Mutation {
    /// Debug name of this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::CreateChild { .. } => "createChild",
            Mutation::CreateSiblingAfter { .. } => "createSiblingAfter",
            Mutation::CreateSiblingBefore { .. } => "createSiblingBefore",
            Mutation::MoveNode { .. } => "moveNode",
            Mutation::RemoveNode { .. } => "removeNode",
            Mutation::UpdateNode { .. } => "updateNode",
            Mutation::UpdateSelectedNode { .. } => "updateSelectedNode",
            Mutation::SelectNode { .. } => "selectNode",
        }
    }

    /// Whether the mutation changes parent/child membership or ordering
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::CreateChild { .. }
                | Mutation::CreateSiblingAfter { .. }
                | Mutation::CreateSiblingBefore { .. }
                | Mutation::MoveNode { .. }
                | Mutation::RemoveNode { .. }
        )
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// Id of the node the mutation created, if any
    pub created: Option<NodeId>,
}
