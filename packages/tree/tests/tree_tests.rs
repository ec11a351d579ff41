//! Structural tests for the content tree

use folio_tree::{Attributes, NodeKey, Placement, Position, Tree, TreeError, TreePayload};
use std::collections::HashSet;

fn stub() -> Tree {
    Tree::from_payload(TreePayload::empty_document()).unwrap()
}

fn ids(tree: &Tree, key: &str) -> Vec<String> {
    tree.children_of(&NodeKey::from(key)).unwrap().iter().cloned().collect()
}

#[test]
fn test_ids_stay_unique_across_removals() {
    let mut tree = stub();
    let mut issued: HashSet<String> = tree.nodes().map(|n| n.id().to_string()).collect();

    for round in 0..50 {
        let id = tree.create_node("paragraph", Attributes::new());
        assert!(issued.insert(id.clone()), "id {} reissued", id);
        tree.attach(&NodeKey::from("1"), &id, &Placement::Append).unwrap();

        // Remove every other node again, purging half of those
        if round % 2 == 0 {
            tree.detach(&id).unwrap();
            if round % 4 == 0 {
                tree.purge(&id).unwrap();
            }
        }
    }

    assert_eq!(issued.len(), 55);
    tree.check_invariants().unwrap();
}

#[test]
fn test_ids_stay_unique_after_reload() {
    let mut tree = stub();
    let a = tree.create_node("paragraph", Attributes::new());
    tree.attach(&NodeKey::Root, &a, &Placement::Append).unwrap();
    tree.detach(&a).unwrap();
    tree.purge(&a).unwrap();

    // The purged id is gone from the payload but the counter remembers it
    let mut reloaded = Tree::from_payload(tree.to_payload()).unwrap();
    let b = reloaded.generate_id();
    assert_ne!(a, b);
    assert_eq!(b, "7");
}

#[test]
fn test_round_trip_preserves_structure() {
    let mut tree = stub();
    for parent in ["1", "2", "root"] {
        let id = tree.create_node("section", Attributes::new());
        tree.attach(&NodeKey::from(parent), &id, &Placement::Append).unwrap();
        let nested = tree.create_node("paragraph", Attributes::new());
        tree.attach(&NodeKey::from(id.as_str()), &nested, &Placement::Append)
            .unwrap();
    }

    let json = tree.to_json_pretty().unwrap();
    let restored = Tree::from_json(&json).unwrap();

    assert_eq!(ids(&restored, "root"), ids(&tree, "root"));
    for node in tree.nodes() {
        let other = restored.node(node.id()).unwrap();
        assert_eq!(other.node_type(), node.node_type());
        assert_eq!(other.attributes(), node.attributes());
        assert_eq!(other.children(), node.children());
        assert_eq!(other.parent(), node.parent());
    }
    assert_eq!(restored.len(), tree.len());
    assert!(restored.node_count() >= tree.node_count());
}

#[test]
fn test_relative_insert_keeps_sibling_order() {
    let mut tree = stub();

    let before = tree.create_node("paragraph", Attributes::new());
    tree.attach(&NodeKey::from("1"), &before, &Placement::relative("5", Position::Before))
        .unwrap();
    assert_eq!(ids(&tree, "1"), vec!["3", before.as_str(), "5"]);

    let after = tree.create_node("paragraph", Attributes::new());
    tree.attach(&NodeKey::from("1"), &after, &Placement::relative("3", Position::After))
        .unwrap();
    assert_eq!(ids(&tree, "1"), vec!["3", after.as_str(), before.as_str(), "5"]);
}

#[test]
fn test_missing_reference_is_invalid_reference() {
    let mut tree = stub();
    let id = tree.create_node("paragraph", Attributes::new());

    let err = tree
        .attach(&NodeKey::Root, &id, &Placement::After("3".into()))
        .unwrap_err();

    assert_eq!(err, TreeError::InvalidReference("3".to_string()));
    assert_eq!(ids(&tree, "root"), vec!["1", "2"]);
}

#[test]
fn test_garbage_nodes_round_trip() {
    let mut tree = stub();
    tree.detach("3").unwrap();

    let payload = tree.to_payload();
    assert!(payload.nodes.contains_key("3"));

    let restored = Tree::from_payload(payload).unwrap();
    assert_eq!(restored.unreachable(), vec!["3"]);
    assert!(!restored.node("3").unwrap().is_attached());
}

#[test]
fn test_reserved_attribute_keys_do_not_break_round_trip() {
    let mut tree = stub();
    let mut attrs = Attributes::new();
    attrs.insert("type".into(), serde_json::json!("x"));
    attrs.insert("children".into(), serde_json::json!(["1"]));
    attrs.insert("content".into(), serde_json::json!("kept"));

    let id = tree.create_node("paragraph", attrs);
    tree.attach(&NodeKey::Root, &id, &Placement::Append).unwrap();

    let node = tree.node(&id).unwrap();
    assert_eq!(node.node_type(), "paragraph");
    assert_eq!(node.attributes().len(), 1);

    let restored = Tree::from_json(&tree.to_json_pretty().unwrap()).unwrap();
    let node = restored.node(&id).unwrap();
    assert_eq!(node.node_type(), "paragraph");
    assert!(node.children().is_empty());
    assert_eq!(node.attribute("content"), Some(&serde_json::json!("kept")));
    restored.check_invariants().unwrap();
}
