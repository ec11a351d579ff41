//! # Document Handle
//!
//! The document is the only public entry point for editing. It owns one
//! [`Tree`], the current selection, the type catalog, the observers and the
//! outbound collaboration channel.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Tree::from_payload → intents (create/move/remove/update/select)
//!   ↓                              ↓
//! payload                   notify observers → publish to collaborators
//! ```
//!
//! Every intent either fails before touching the tree or commits and then
//! emits its notifications synchronously, before returning.

use crate::collab::{CollabChannel, CollabMessage, NullChannel};
use crate::config::{EditorConfig, RemovalPolicy};
use crate::events::{DocumentEvent, Listener, ListenerId, Listeners};
use crate::{EditorError, EditorResult, Mutation, MutationResult};
use folio_tree::{
    Attributes, NodeId, NodeKey, NodeRef, Placement, Position, Tree, TreeError, TreePayload,
    TypeCatalog,
};
use std::fmt;
use tracing::{debug, info};

/// Editable structured document
pub struct Document {
    /// Backend identifier, once the document has been saved somewhere
    pub id: Option<String>,

    /// Current version number (increments on each committed mutation)
    pub version: u64,

    tree: Tree,
    selected: Option<NodeKey>,
    catalog: Box<dyn TypeCatalog>,
    config: EditorConfig,
    listeners: Listeners,
    channel: Box<dyn CollabChannel>,
}

impl Document {
    /// Create a document with an empty tree
    pub fn new(catalog: impl TypeCatalog + 'static) -> Self {
        Self {
            id: None,
            version: 0,
            tree: Tree::new(),
            selected: None,
            catalog: Box::new(catalog),
            config: EditorConfig::default(),
            listeners: Listeners::new(),
            channel: Box::new(NullChannel),
        }
    }

    /// Create a document from a flat payload
    pub fn load(payload: TreePayload, catalog: impl TypeCatalog + 'static) -> EditorResult<Self> {
        let mut doc = Self::new(catalog);
        doc.tree = Tree::from_payload(payload)?;
        info!(nodes = doc.tree.len(), "Loaded document");
        Ok(doc)
    }

    pub fn from_json(json: &str, catalog: impl TypeCatalog + 'static) -> EditorResult<Self> {
        Self::load(TreePayload::from_json(json).map_err(TreeError::from)?, catalog)
    }

    /// Create a document from the standard new-document stub
    pub fn empty_document(catalog: impl TypeCatalog + 'static) -> EditorResult<Self> {
        Self::load(TreePayload::empty_document(), catalog)
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_channel(mut self, channel: impl CollabChannel + 'static) -> Self {
        self.channel = Box::new(channel);
        self
    }

    pub fn set_channel(&mut self, channel: impl CollabChannel + 'static) {
        self.channel = Box::new(channel);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the whole tree with freshly loaded content.
    ///
    /// The previous tree is discarded, the selection is cleared and a
    /// `change:node` is emitted for the root.
    pub fn reload(&mut self, payload: TreePayload) -> EditorResult<()> {
        self.tree = Tree::from_payload(payload)?;
        self.selected = None;
        info!(nodes = self.tree.len(), "Reloaded document");
        self.emit(DocumentEvent::ChangeNode(NodeKey::Root));
        Ok(())
    }

    /// Location of the document on the backend
    pub fn url(&self) -> String {
        match &self.id {
            Some(id) => format!("/documents/{}", id),
            None => "/documents/".to_string(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn to_payload(&self) -> TreePayload {
        self.tree.to_payload()
    }

    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(self.tree.to_json_pretty()?)
    }

    /// Resolve an id, `"root"` included
    pub fn node(&self, id: &str) -> EditorResult<NodeRef<'_>> {
        Ok(self.tree.lookup(id)?)
    }

    pub fn selected_key(&self) -> Option<&NodeKey> {
        self.selected.as_ref()
    }

    pub fn selected_node(&self) -> Option<NodeRef<'_>> {
        self.selected
            .as_ref()
            .and_then(|key| self.tree.resolve(key).ok())
    }

    /// Register an observer for `change:node` and `select:node`
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent, &Tree) + 'static) -> ListenerId {
        let listener: Listener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Append a new node of `node_type` to `parent_id`'s children and select it
    pub fn create_child(&mut self, node_type: &str, parent_id: &str) -> EditorResult<NodeId> {
        let parent = self.live_key(parent_id)?;
        self.insert_new(node_type, parent, Placement::Append)
    }

    /// Insert a new node right after `predecessor_id` and select it
    pub fn create_sibling_after(&mut self, node_type: &str, predecessor_id: &str) -> EditorResult<NodeId> {
        self.live_key(predecessor_id)?;
        let parent = self.tree.parent_of(predecessor_id)?;
        self.insert_new(node_type, parent, Placement::relative(predecessor_id, Position::After))
    }

    /// Insert a new node right before `successor_id` and select it
    pub fn create_sibling_before(&mut self, node_type: &str, successor_id: &str) -> EditorResult<NodeId> {
        self.live_key(successor_id)?;
        let parent = self.tree.parent_of(successor_id)?;
        self.insert_new(node_type, parent, Placement::relative(successor_id, Position::Before))
    }

    fn insert_new(&mut self, node_type: &str, parent: NodeKey, placement: Placement) -> EditorResult<NodeId> {
        let defaults = self
            .catalog
            .defaults(node_type)
            .ok_or_else(|| TreeError::UnknownType(node_type.to_string()))?;

        // Check the placement before minting anything
        self.tree.children_of(&parent)?.index_for(&placement)?;

        let id = self.tree.create_node(node_type, defaults);
        self.tree.attach(&parent, &id, &placement)?;
        self.version += 1;
        debug!(node_id = %id, parent = %parent, node_type, "Inserted node");

        self.emit(DocumentEvent::ChangeNode(parent));
        self.select_key(NodeKey::Node(id.clone()));
        Ok(id)
    }

    /// Move `source_id` next to `target_id`, under the target's parent.
    ///
    /// Moving a node onto itself does nothing and emits nothing. All
    /// lookups, and the check that the target is not inside the source's
    /// subtree, happen before the source is detached, so a failed move
    /// leaves the tree untouched.
    pub fn move_node(&mut self, source_id: &str, target_id: &str, position: Position) -> EditorResult<()> {
        if source_id == target_id {
            return Ok(());
        }

        self.live_key(source_id)?;
        self.live_key(target_id)?;
        let source_parent = self.tree.parent_of(source_id)?;
        let target_parent = self.tree.parent_of(target_id)?;

        let source_key = NodeKey::Node(source_id.to_string());
        if let NodeKey::Node(parent_id) = &target_parent {
            if parent_id == source_id || self.tree.is_ancestor(&source_key, parent_id) {
                return Err(TreeError::CycleDetected {
                    source_id: source_id.to_string(),
                    target_id: target_id.to_string(),
                }
                .into());
            }
        }

        self.tree.detach(source_id)?;
        self.tree
            .attach(&target_parent, source_id, &Placement::relative(target_id, position))?;
        self.version += 1;
        debug!(source_id, target_id, ?position, "Moved node");

        let changed_parents = source_parent != target_parent;
        self.emit(DocumentEvent::ChangeNode(source_parent));
        if changed_parents {
            self.emit(DocumentEvent::ChangeNode(target_parent));
        }
        Ok(())
    }

    /// Detach `node_id` from its parent.
    ///
    /// With [`RemovalPolicy::Retain`] the subtree stays in the node map;
    /// with [`RemovalPolicy::Purge`] it is dropped. A selection that is no
    /// longer reachable is cleared.
    pub fn remove_node(&mut self, node_id: &str) -> EditorResult<()> {
        self.live_key(node_id)?;
        let parent = self.tree.parent_of(node_id)?;
        self.tree.detach(node_id)?;

        if self.config.removal_policy == RemovalPolicy::Purge {
            self.tree.purge(node_id)?;
        }

        if let Some(selected) = &self.selected {
            if !self.tree.is_reachable(selected) {
                debug!(selected = %selected, "Selection removed with its subtree");
                self.selected = None;
            }
        }

        self.version += 1;
        debug!(node_id, parent = %parent, policy = ?self.config.removal_policy, "Removed node");
        self.emit(DocumentEvent::ChangeNode(parent));
        Ok(())
    }

    /// Merge `attrs` into a node and emit `change:node` for it
    pub fn update_node(&mut self, node_id: &str, attrs: &Attributes) -> EditorResult<()> {
        if node_id == folio_tree::ROOT_KEY {
            return Err(EditorError::RootNotAllowed("update"));
        }
        self.live_key(node_id)?;
        self.tree.node_mut(node_id)?.merge_attributes(attrs);
        self.version += 1;

        self.emit(DocumentEvent::ChangeNode(NodeKey::Node(node_id.to_string())));
        Ok(())
    }

    /// Merge `attrs` into the selected node.
    ///
    /// `change:node` is emitted only when `notify` is set. The new state is
    /// always published to collaborators.
    pub fn update_selected_node(&mut self, attrs: &Attributes, notify: bool) -> EditorResult<()> {
        let node_id = match &self.selected {
            None => return Err(EditorError::NoSelection),
            Some(NodeKey::Root) => return Err(EditorError::RootNotAllowed("update")),
            Some(NodeKey::Node(id)) => id.clone(),
        };

        let node = self.tree.node_mut(&node_id)?;
        node.merge_attributes(attrs);
        let message = CollabMessage::change_node(node);
        self.version += 1;

        if notify {
            self.emit(DocumentEvent::ChangeNode(NodeKey::Node(node_id.clone())));
        }

        debug!(node_id = %node_id, notify, "Publishing selected node change");
        self.channel.send(message);
        Ok(())
    }

    /// Select a node (or the root) and emit `select:node`
    pub fn select_node(&mut self, node_id: &str) -> EditorResult<()> {
        let key = self.live_key(node_id)?;
        self.select_key(key);
        Ok(())
    }

    /// Resolve an id that must be reachable from the root. Removed nodes
    /// that are still held in the node map are reported as detached.
    fn live_key(&self, id: &str) -> EditorResult<NodeKey> {
        let key = self.tree.lookup(id)?.key();
        if !self.tree.is_reachable(&key) {
            return Err(TreeError::Detached(id.to_string()).into());
        }
        Ok(key)
    }

    fn select_key(&mut self, key: NodeKey) {
        self.selected = Some(key.clone());
        self.emit(DocumentEvent::SelectNode(key));
    }

    /// Apply a serialized intent
    pub fn apply(&mut self, mutation: Mutation) -> EditorResult<MutationResult> {
        debug!(mutation = mutation.name(), "Applying mutation");

        let created = match mutation {
            Mutation::CreateChild { node_type, parent_id } => {
                Some(self.create_child(&node_type, &parent_id)?)
            }
            Mutation::CreateSiblingAfter { node_type, predecessor_id } => {
                Some(self.create_sibling_after(&node_type, &predecessor_id)?)
            }
            Mutation::CreateSiblingBefore { node_type, successor_id } => {
                Some(self.create_sibling_before(&node_type, &successor_id)?)
            }
            Mutation::MoveNode { source_id, target_id, position } => {
                self.move_node(&source_id, &target_id, position)?;
                None
            }
            Mutation::RemoveNode { node_id } => {
                self.remove_node(&node_id)?;
                None
            }
            Mutation::UpdateNode { node_id, attributes } => {
                self.update_node(&node_id, &attributes)?;
                None
            }
            Mutation::UpdateSelectedNode { attributes, notify } => {
                self.update_selected_node(&attributes, notify)?;
                None
            }
            Mutation::SelectNode { node_id } => {
                self.select_node(&node_id)?;
                None
            }
        };

        Ok(MutationResult {
            version: self.version,
            created,
        })
    }

    fn emit(&mut self, event: DocumentEvent) {
        self.listeners.emit(&event, &self.tree);
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("nodes", &self.tree.len())
            .field("selected", &self.selected)
            .field("config", &self.config)
            .field("listeners", &self.listeners)
            .finish()
    }
}
