//! # Content Tree
//!
//! The tree is an arena: it owns every [`Node`] in a map keyed by identity,
//! plus the ordered list of top-level ids. Nodes point at each other only by
//! id, and each caches the key of its current parent.
//!
//! ## Invariants
//!
//! 1. Every id in any child list resolves to a node in `nodes`
//! 2. A node appears in at most one child list, and only attached nodes do
//! 3. A node's parent key names the container whose list holds it
//! 4. Ids come from a counter that never repeats a value
//!
//! Nodes that were detached but never purged stay in `nodes`. They are not
//! reachable from the root and still round-trip through the payload.

use crate::errors::{TreeError, TreeResult};
use crate::id_generator::IdGenerator;
use crate::node::{Attributes, Children, Node, NodeId, NodeKey, Placement, ROOT_KEY};
use crate::payload::{NodeRecord, TreePayload};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Result of resolving an id: the root container itself, or a node
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Tree),
    Node(&'a Node),
}

impl<'a> NodeRef<'a> {
    pub fn key(&self) -> NodeKey {
        match self {
            NodeRef::Root(_) => NodeKey::Root,
            NodeRef::Node(node) => node.key(),
        }
    }

    pub fn children(&self) -> &'a Children {
        match self {
            NodeRef::Root(tree) => tree.children(),
            NodeRef::Node(node) => node.children(),
        }
    }

    /// The node, or `None` for the root
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            NodeRef::Root(_) => None,
            NodeRef::Node(node) => Some(node),
        }
    }
}

/// Root container owning all nodes of one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    children: Children,
    ids: IdGenerator,
    extra: serde_json::Map<String, Value>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh identity and advance the counter.
    ///
    /// Skips any value already used as a key, so a payload whose
    /// `nodeCount` lags behind its ids cannot cause a collision.
    pub fn generate_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_id();
            if !self.nodes.contains_key(&id) && id != ROOT_KEY {
                return id;
            }
        }
    }

    /// Current value of the identity counter
    pub fn node_count(&self) -> u64 {
        self.ids.count()
    }

    /// Number of nodes owned by the tree, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve an id. `"root"` resolves to the tree itself.
    pub fn lookup(&self, id: &str) -> TreeResult<NodeRef<'_>> {
        if id == ROOT_KEY {
            return Ok(NodeRef::Root(self));
        }
        self.nodes
            .get(id)
            .map(NodeRef::Node)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    /// Resolve a container key
    pub fn resolve(&self, key: &NodeKey) -> TreeResult<NodeRef<'_>> {
        self.lookup(key.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node(&self, id: &str) -> TreeResult<&Node> {
        self.get(id).ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    pub fn node_mut(&mut self, id: &str) -> TreeResult<&mut Node> {
        self.get_mut(id).ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All owned nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The root's own child list
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Child list of the root or of a node
    pub fn children_of(&self, key: &NodeKey) -> TreeResult<&Children> {
        match key {
            NodeKey::Root => Ok(&self.children),
            NodeKey::Node(id) => Ok(self.node(id)?.children()),
        }
    }

    fn children_of_mut(&mut self, key: &NodeKey) -> TreeResult<&mut Children> {
        match key {
            NodeKey::Root => Ok(&mut self.children),
            NodeKey::Node(id) => Ok(self.node_mut(id)?.children_mut()),
        }
    }

    /// Key of the container currently holding `id`
    pub fn parent_of(&self, id: &str) -> TreeResult<NodeKey> {
        if id == ROOT_KEY {
            return Err(TreeError::RootHasNoParent);
        }
        self.node(id)?
            .parent()
            .cloned()
            .ok_or_else(|| TreeError::Detached(id.to_string()))
    }

    /// Document-level fields carried with the payload (`title`, `author`, ...)
    pub fn extra(&self) -> &serde_json::Map<String, Value> {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut serde_json::Map<String, Value> {
        &mut self.extra
    }

    /// Create a detached node with a fresh id
    pub fn create_node(&mut self, node_type: impl Into<String>, attributes: Attributes) -> NodeId {
        let id = self.generate_id();
        let node = Node::new(id.clone(), node_type, attributes);
        debug!(node_id = %id, node_type = %node.node_type(), "Created node");
        self.nodes.insert(id.clone(), node);
        id
    }

    /// Attach a detached node under `parent` at `placement`.
    ///
    /// Refuses nodes that already have a parent, so a node can never end up
    /// in two child lists. Nothing changes when an error is returned.
    #[instrument(level = "debug", skip(self))]
    pub fn attach(&mut self, parent: &NodeKey, id: &str, placement: &Placement) -> TreeResult<()> {
        if self.node(id)?.is_attached() {
            return Err(TreeError::AlreadyAttached(id.to_string()));
        }
        if let NodeKey::Node(parent_id) = parent {
            self.node(parent_id)?;
            if parent_id == id || self.is_ancestor(&NodeKey::Node(id.to_string()), parent_id) {
                return Err(TreeError::CycleDetected {
                    source_id: id.to_string(),
                    target_id: parent_id.clone(),
                });
            }
        }

        self.children_of_mut(parent)?.insert(id.to_string(), placement)?;
        self.node_mut(id)?.set_parent(Some(parent.clone()));
        Ok(())
    }

    /// Remove `id` from its parent's child list. The node and its subtree
    /// stay owned by the tree. Returns the former parent.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, id: &str) -> TreeResult<NodeKey> {
        let parent = self.parent_of(id)?;
        self.children_of_mut(&parent)?.remove(id);
        self.node_mut(id)?.set_parent(None);
        Ok(parent)
    }

    /// Drop a detached node and all of its descendants from the arena.
    /// Returns the removed ids.
    pub fn purge(&mut self, id: &str) -> TreeResult<Vec<NodeId>> {
        if self.node(id)?.is_attached() {
            return Err(TreeError::AlreadyAttached(id.to_string()));
        }

        let mut removed = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children().iter().cloned());
                removed.push(next);
            }
        }

        debug!(node_id = %id, purged = removed.len(), "Purged subtree");
        Ok(removed)
    }

    /// Whether `ancestor` is a proper ancestor of `id`
    pub fn is_ancestor(&self, ancestor: &NodeKey, id: &str) -> bool {
        let mut current = self.get(id).and_then(Node::parent);
        let mut steps = 0;
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = match key {
                NodeKey::Root => None,
                NodeKey::Node(parent_id) => self.get(parent_id).and_then(Node::parent),
            };
        }
        false
    }

    /// Whether `key` can be reached from the root
    pub fn is_reachable(&self, key: &NodeKey) -> bool {
        match key {
            NodeKey::Root => true,
            NodeKey::Node(id) => self.is_ancestor(&NodeKey::Root, id),
        }
    }

    /// Reachable nodes in reading order, with their depth (top level = 0)
    pub fn walk(&self) -> Vec<(usize, &Node)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &NodeId)> =
            self.children.iter().rev().map(|id| (0, id)).collect();

        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push((depth, node));
                stack.extend(node.children().iter().rev().map(|c| (depth + 1, c)));
            }
        }
        out
    }

    /// Ids owned by the tree but not reachable from the root, sorted
    pub fn unreachable(&self) -> Vec<&str> {
        let reachable: HashSet<&str> = self.walk().into_iter().map(|(_, n)| n.id()).collect();
        let mut garbage: Vec<&str> = self
            .nodes
            .keys()
            .map(String::as_str)
            .filter(|id| !reachable.contains(id))
            .collect();
        garbage.sort();
        garbage
    }

    /// Verify the structural invariants, reporting the first violation
    pub fn check_invariants(&self) -> TreeResult<()> {
        let mut containers: Vec<(NodeKey, &Children)> = Vec::with_capacity(self.nodes.len() + 1);
        containers.push((NodeKey::Root, &self.children));
        containers.extend(self.nodes.values().map(|n| (n.key(), n.children())));

        let mut seen: HashMap<&str, &NodeKey> = HashMap::new();
        for (container, children) in &containers {
            for child in children.iter() {
                let node = self.get(child).ok_or_else(|| {
                    TreeError::Corrupt(format!("{} lists missing child {}", container, child))
                })?;
                if let Some(previous) = seen.insert(child.as_str(), container) {
                    return Err(TreeError::Corrupt(format!(
                        "{} is listed under both {} and {}",
                        child, previous, container
                    )));
                }
                if node.parent() != Some(container) {
                    return Err(TreeError::Corrupt(format!(
                        "{} is listed under {} but its parent is {}",
                        child,
                        container,
                        node.parent().map(NodeKey::as_str).unwrap_or("<none>")
                    )));
                }
            }
        }

        for node in self.nodes.values() {
            if let Some(parent) = node.parent() {
                if !seen.contains_key(node.id()) {
                    return Err(TreeError::Corrupt(format!(
                        "{} claims parent {} which does not list it",
                        node.id(),
                        parent
                    )));
                }
                if self.is_ancestor(&node.key(), node.id()) {
                    return Err(TreeError::Corrupt(format!("{} is its own ancestor", node.id())));
                }
            }
        }

        Ok(())
    }

    /// Rebuild a tree from its flat representation
    pub fn from_payload(payload: TreePayload) -> TreeResult<Self> {
        let TreePayload {
            children,
            node_count,
            nodes: records,
            extra,
        } = payload;

        if records.contains_key(ROOT_KEY) {
            return Err(TreeError::Payload("\"root\" cannot be used as a node id".into()));
        }

        let mut parents: HashMap<NodeId, NodeKey> = HashMap::new();
        let lists = std::iter::once((NodeKey::Root, &children))
            .chain(records.iter().map(|(id, r)| (NodeKey::Node(id.clone()), &r.children)));

        for (container, list) in lists {
            for child in list {
                if !records.contains_key(child) {
                    return Err(TreeError::NotFound(child.clone()));
                }
                if let Some(previous) = parents.insert(child.clone(), container.clone()) {
                    return Err(TreeError::Corrupt(format!(
                        "{} is listed under both {} and {}",
                        child, previous, container
                    )));
                }
            }
        }

        let highest_numeric = records.keys().filter_map(|id| id.parse::<u64>().ok()).max();
        let mut ids = IdGenerator::from_count(node_count.unwrap_or(0));
        ids.bump_to(highest_numeric.unwrap_or(0));
        ids.bump_to(records.len() as u64);

        let mut nodes = HashMap::with_capacity(records.len());
        for (id, record) in records {
            let NodeRecord {
                node_type,
                children,
                attributes,
            } = record;
            let mut node = Node::new(id.clone(), node_type, attributes);
            node.set_children(Children::from(children));
            node.set_parent(parents.remove(&id));
            nodes.insert(id, node);
        }

        let tree = Self {
            nodes,
            children: Children::from(children),
            ids,
            extra,
        };
        tree.check_invariants()?;

        debug!(nodes = tree.len(), node_count = tree.node_count(), "Loaded tree");
        Ok(tree)
    }

    /// Flatten the tree into its identity-indexed representation
    pub fn to_payload(&self) -> TreePayload {
        TreePayload {
            children: self.children.iter().cloned().collect(),
            node_count: Some(self.ids.count()),
            nodes: self
                .nodes
                .iter()
                .map(|(id, node)| (id.clone(), NodeRecord::from(node)))
                .collect(),
            extra: self.extra.clone(),
        }
    }

    pub fn from_json(json: &str) -> TreeResult<Self> {
        Self::from_payload(TreePayload::from_json(json)?)
    }

    pub fn to_json_pretty(&self) -> TreeResult<String> {
        Ok(self.to_payload().to_json_pretty()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stub() -> Tree {
        Tree::from_payload(TreePayload::empty_document()).unwrap()
    }

    fn child_ids<'a>(tree: &'a Tree, key: &str) -> Vec<&'a str> {
        tree.children_of(&NodeKey::from(key))
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_load_stub_restores_parents() {
        let tree = stub();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(child_ids(&tree, "root"), vec!["1", "2"]);
        assert_eq!(tree.parent_of("1").unwrap(), NodeKey::Root);
        assert_eq!(tree.parent_of("5").unwrap(), NodeKey::from("1"));
        assert_eq!(tree.parent_of("4").unwrap(), NodeKey::from("2"));
        assert_eq!(tree.parent_of("root"), Err(TreeError::RootHasNoParent));
    }

    #[test]
    fn test_generate_id_continues_counter() {
        let mut tree = stub();
        assert_eq!(tree.generate_id(), "6");
        assert_eq!(tree.generate_id(), "7");
        assert_eq!(tree.node_count(), 7);
    }

    #[test]
    fn test_generate_id_skips_existing_keys() {
        let payload = TreePayload::from_json(
            r#"{ "children": ["9"], "nodeCount": 1, "nodes": { "9": { "type": "paragraph" } } }"#,
        )
        .unwrap();
        let mut tree = Tree::from_payload(payload).unwrap();

        // Counter is lifted past the highest numeric id
        assert_eq!(tree.generate_id(), "10");
    }

    #[test]
    fn test_lookup_root_and_missing() {
        let tree = stub();

        assert!(matches!(tree.lookup("root").unwrap(), NodeRef::Root(_)));
        assert_eq!(tree.lookup("3").unwrap().key(), NodeKey::from("3"));
        assert_eq!(
            tree.lookup("42").unwrap_err(),
            TreeError::NotFound("42".to_string())
        );
    }

    #[test]
    fn test_attach_and_detach() {
        let mut tree = stub();
        let id = tree.create_node("paragraph", Attributes::new());

        tree.attach(&NodeKey::from("1"), &id, &Placement::After("3".into()))
            .unwrap();
        assert_eq!(child_ids(&tree, "1"), vec!["3", id.as_str(), "5"]);
        assert_eq!(tree.parent_of(&id).unwrap(), NodeKey::from("1"));

        let former = tree.detach(&id).unwrap();
        assert_eq!(former, NodeKey::from("1"));
        assert_eq!(child_ids(&tree, "1"), vec!["3", "5"]);
        assert_eq!(tree.parent_of(&id), Err(TreeError::Detached(id.clone())));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_attach_refuses_attached_node() {
        let mut tree = stub();
        let err = tree
            .attach(&NodeKey::from("2"), "3", &Placement::Append)
            .unwrap_err();

        assert_eq!(err, TreeError::AlreadyAttached("3".to_string()));
        assert_eq!(child_ids(&tree, "2"), vec!["4"]);
    }

    #[test]
    fn test_attach_with_bad_reference_leaves_node_detached() {
        let mut tree = stub();
        let id = tree.create_node("paragraph", Attributes::new());

        let err = tree
            .attach(&NodeKey::from("1"), &id, &Placement::Before("4".into()))
            .unwrap_err();

        assert_eq!(err, TreeError::InvalidReference("4".to_string()));
        assert!(!tree.node(&id).unwrap().is_attached());
    }

    #[test]
    fn test_attach_under_own_descendant_is_a_cycle() {
        let mut tree = stub();
        tree.detach("1").unwrap();

        let err = tree
            .attach(&NodeKey::from("3"), "1", &Placement::Append)
            .unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
    }

    #[test]
    fn test_detached_subtree_is_retained_until_purged() {
        let mut tree = stub();
        tree.detach("1").unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.unreachable(), vec!["1", "3", "5"]);
        assert!(!tree.is_reachable(&NodeKey::from("3")));

        let mut removed = tree.purge("1").unwrap();
        removed.sort();
        assert_eq!(removed, vec!["1", "3", "5"]);
        assert_eq!(tree.len(), 2);
        assert!(tree.unreachable().is_empty());
    }

    #[test]
    fn test_purge_refuses_attached_node() {
        let mut tree = stub();
        assert_eq!(
            tree.purge("3").unwrap_err(),
            TreeError::AlreadyAttached("3".to_string())
        );
    }

    #[test]
    fn test_walk_is_reading_order() {
        let tree = stub();
        let order: Vec<(usize, &str)> = tree.walk().into_iter().map(|(d, n)| (d, n.id())).collect();

        assert_eq!(order, vec![(0, "1"), (1, "3"), (1, "5"), (0, "2"), (1, "4")]);
    }

    #[test]
    fn test_payload_round_trip() {
        let mut tree = stub();
        let id = tree.create_node("paragraph", Attributes::new());
        tree.attach(&NodeKey::Root, &id, &Placement::Before("2".into()))
            .unwrap();

        let restored = Tree::from_payload(tree.to_payload()).unwrap();

        assert_eq!(restored, tree);
        assert_eq!(restored.node_count(), tree.node_count());
        assert_eq!(restored.extra().get("title"), Some(&json!("Untitled")));
    }

    #[test]
    fn test_rejects_dangling_child() {
        let json = r#"{ "children": ["1"], "nodes": { "1": { "type": "section", "children": ["8"] } } }"#;
        assert_eq!(
            Tree::from_json(json).unwrap_err(),
            TreeError::NotFound("8".to_string())
        );
    }

    #[test]
    fn test_rejects_shared_child() {
        let json = r#"{
            "children": ["1", "2"],
            "nodes": {
                "1": { "type": "section", "children": ["3"] },
                "2": { "type": "section", "children": ["3"] },
                "3": { "type": "paragraph" }
            }
        }"#;
        assert!(matches!(Tree::from_json(json), Err(TreeError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_detached_cycle() {
        let json = r#"{
            "children": [],
            "nodes": {
                "1": { "type": "section", "children": ["2"] },
                "2": { "type": "section", "children": ["1"] }
            }
        }"#;
        assert!(matches!(Tree::from_json(json), Err(TreeError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_root_key_in_nodes() {
        let json = r#"{ "children": [], "nodes": { "root": { "type": "section" } } }"#;
        assert!(matches!(Tree::from_json(json), Err(TreeError::Payload(_))));
    }

    #[test]
    fn test_missing_node_count_is_derived() {
        let json = r#"{
            "children": ["4"],
            "nodes": { "4": { "type": "paragraph" } }
        }"#;
        let mut tree = Tree::from_json(json).unwrap();

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.generate_id(), "5");
    }
}
