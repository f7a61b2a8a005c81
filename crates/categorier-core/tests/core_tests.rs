//! Tests for categorier-core: snapshot schema, attribute values, errors

use categorier_core::*;

// ===========================================================================
// Direction
// ===========================================================================

#[test]
fn direction_opposite_flips() {
    assert_eq!(Direction::Parents.opposite(), Direction::Children);
    assert_eq!(Direction::Children.opposite(), Direction::Parents);
}

#[test]
fn direction_display_and_noun() {
    assert_eq!(Direction::Parents.to_string(), "parents");
    assert_eq!(Direction::Children.to_string(), "children");
    assert_eq!(Direction::Parents.member_noun(), "parent");
    assert_eq!(Direction::Children.member_noun(), "child");
}

// ===========================================================================
// AttributeValue
// ===========================================================================

#[test]
fn attribute_scalar_accessors() {
    let v = AttributeValue::scalar("Orwell");
    assert_eq!(v.as_scalar(), Some("Orwell"));
    assert!(v.as_list().is_none());
    assert_eq!(v.values(), vec!["Orwell"]);
    assert_eq!(v.len(), 1);
    assert_eq!(v.to_string(), "Orwell");
}

#[test]
fn attribute_list_accessors() {
    let v = AttributeValue::list(["Muhamad", "ibn", "Hatimi"]);
    assert!(v.as_scalar().is_none());
    assert_eq!(v.as_list().unwrap().len(), 3);
    assert_eq!(v.values(), vec!["Muhamad", "ibn", "Hatimi"]);
    assert_eq!(v.to_string(), "[Muhamad, ibn, Hatimi]");
}

#[test]
fn empty_list_is_empty() {
    let v = AttributeValue::list(Vec::<String>::new());
    assert!(v.is_empty());
}

// ===========================================================================
// Snapshot (YAML)
// ===========================================================================

#[test]
fn snapshot_empty_document_is_empty_graph() {
    assert!(Snapshot::from_yaml("").unwrap().is_empty());
    assert!(Snapshot::from_yaml("   \n").unwrap().is_empty());
    assert!(Snapshot::from_yaml("~").unwrap().is_empty());
}

#[test]
fn snapshot_missing_edges_default_to_empty() {
    let yaml = "a:\n  attributes:\n    author: Orwell\nb:\n  parents: [a]\n";
    let snap = Snapshot::from_yaml(yaml).unwrap();
    let a = snap.get("a").unwrap();
    assert!(a.parents.is_empty());
    assert!(a.children.is_empty());
    assert_eq!(a.attributes["author"], AttributeValue::scalar("Orwell"));
    assert_eq!(snap.get("b").unwrap().parents.len(), 1);
}

#[test]
fn snapshot_preserves_insertion_order() {
    let yaml = "zeta: {}\nalpha: {}\nmid:\n  attributes:\n    z: one\n    a: [x, y]\n";
    let snap = Snapshot::from_yaml(yaml).unwrap();
    let names: Vec<&str> = snap.nodes.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);

    let keys: Vec<&str> = snap.get("mid").unwrap().attributes.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a"]);

    let again = Snapshot::from_yaml(&snap.to_yaml().unwrap()).unwrap();
    assert_eq!(snap, again);
}

#[test]
fn snapshot_omits_empty_sections() {
    let snap: Snapshot = [("lonely".to_string(), NodeRecord::default())].into_iter().collect();
    let yaml = snap.to_yaml().unwrap();
    assert!(!yaml.contains("parents"));
    assert!(!yaml.contains("children"));
    assert!(!yaml.contains("attributes"));
}

#[test]
fn snapshot_numeric_looking_strings_survive() {
    let mut record = NodeRecord::default();
    record.attributes.insert("year".into(), AttributeValue::scalar("1934"));
    let snap: Snapshot = [("book".to_string(), record)].into_iter().collect();
    let back = Snapshot::from_yaml(&snap.to_yaml().unwrap()).unwrap();
    assert_eq!(back.get("book").unwrap().attributes["year"], AttributeValue::scalar("1934"));
}

#[test]
fn snapshot_malformed_yaml_is_error() {
    let err = Snapshot::from_yaml("a: [unterminated").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn snapshot_unknown_node_keys_are_rejected() {
    let yaml = "a:\n  parents: []\n  descriptions: [keep me]\n  color: red\n";
    let err = Snapshot::from_yaml(yaml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(matches!(err, Error::Yaml(_)));
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_kinds() {
    assert_eq!(Error::node_not_found("x").kind(), ErrorKind::NotFound);
    assert_eq!(Error::already_exists("x").kind(), ErrorKind::AlreadyExists);
    assert_eq!(Error::cycle("a", "b").kind(), ErrorKind::Cycle);
    assert_eq!(Error::validation("bad").kind(), ErrorKind::Validation);
    assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Storage);
}

#[test]
fn error_display() {
    assert_eq!(Error::node_not_found("x").to_string(), "node not found: x");
    assert_eq!(Error::not_found("parent", "p").to_string(), "parent not found: p");
    assert_eq!(Error::already_exists("x").to_string(), "node already exists: x");
    assert_eq!(
        Error::cycle("a", "b").to_string(),
        "cycle: b is already on the opposite side of a"
    );
}
