use std::any::Any;

use nodal::{
    Entry, Error, Node, NodeType, Result,
    behavior::{Adopt, Behavior, ChildValidate, Next, Operation},
    node::{Capability, NodeError},
};

use crate::helpers::indexed_type;

/// Inner stage refusing every insert, to exercise rollback.
#[derive(Debug)]
struct RejectAll;

impl Behavior for RejectAll {
    fn name(&self) -> &'static str {
        "reject_all"
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Set]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set(&self, _node: &Node, key: String, _entry: Entry, _next: Next<'_>) -> Result<()> {
        Err(NodeError::InvalidChildType {
            key,
            reason: "rejected".to_string(),
        }
        .into())
    }
}

fn rejecting_type() -> NodeType {
    NodeType::builder("Rejecting")
        .behavior(Adopt)
        .behavior(RejectAll)
        .build()
        .unwrap()
}

#[test]
fn test_insert_sets_parent_and_name() {
    let parent = Node::new();
    let child = Node::new();

    parent.set("k", child.clone()).unwrap();

    assert!(child.parent().unwrap().ptr_eq(&parent));
    assert_eq!(child.name().as_deref(), Some("k"));
    assert!(parent.get_node("k").unwrap().ptr_eq(&child));
}

#[test]
fn test_inner_failure_rolls_back_unattached_node() {
    let parent = rejecting_type().create();
    let child = Node::new();

    let err = parent.set("k", child.clone()).unwrap_err();

    assert!(err.is_invalid_child());
    assert!(child.parent().is_none());
    assert!(child.name().is_none());
    assert!(!parent.contains("k"));
}

#[test]
fn test_inner_failure_restores_previous_name() {
    let child = Node::new();
    child.set_name("home");

    let parent = rejecting_type().create();
    assert!(parent.set("away", child.clone()).unwrap_err().is_invalid_child());

    assert!(child.parent().is_none());
    assert_eq!(child.name().as_deref(), Some("home"));
}

#[test]
fn test_validation_rejects_before_adoption() {
    let picky = NodeType::builder("Picky")
        .behavior(ChildValidate::with_capability(Capability::node_type("Wanted")))
        .behavior(Adopt)
        .build()
        .unwrap();
    let parent = picky.create();
    let child = Node::new();

    let err = parent.set("k", child.clone()).unwrap_err();

    assert!(err.is_invalid_child());
    assert!(child.parent().is_none());
    assert!(child.name().is_none());
}

#[test]
fn test_second_key_for_attached_child_is_refused() {
    let parent = Node::new();
    let child = Node::new();
    parent.set("first", child.clone()).unwrap();

    let err = parent.set("second", child.clone()).unwrap_err();

    assert!(err.is_conflict());
    assert!(matches!(
        err,
        Error::Node(NodeError::AlreadyAttached { ref key, ref name }) if key == "second" && name == "first"
    ));
    assert_eq!(parent.keys(), vec!["first"]);
    assert_eq!(child.name().as_deref(), Some("first"));
    assert!(child.parent().unwrap().ptr_eq(&parent));
}

#[test]
fn test_attached_child_cannot_join_another_tree() {
    let home = indexed_type().create();
    let away = indexed_type().create();
    let child = indexed_type().create();
    home.set("a", child.clone()).unwrap();

    let err = away.set("b", child.clone()).unwrap_err();

    assert!(matches!(err, Error::Node(NodeError::AlreadyAttached { .. })));
    assert!(away.is_empty());
    assert!(home.get_node("a").unwrap().ptr_eq(&child));
    assert!(child.parent().unwrap().ptr_eq(&home));
    assert_eq!(child.name().as_deref(), Some("a"));
}

#[test]
fn test_deleted_child_can_move() {
    let home = Node::new();
    let away = Node::new();
    let child = Node::new();
    home.set("a", child.clone()).unwrap();

    home.delete("a").unwrap();
    away.set("b", child.clone()).unwrap();

    assert!(home.is_empty());
    assert!(child.parent().unwrap().ptr_eq(&away));
    assert_eq!(child.path(), vec!["b"]);
}

#[test]
fn test_child_of_dropped_parent_can_be_adopted() {
    let child = Node::new();
    {
        let gone = Node::new();
        gone.set("a", child.clone()).unwrap();
    }

    let parent = Node::new();
    parent.set("b", child.clone()).unwrap();

    assert!(child.parent().unwrap().ptr_eq(&parent));
    assert_eq!(child.name().as_deref(), Some("b"));
}

#[test]
fn test_replaced_child_is_released() {
    let parent = Node::new();
    let first = Node::new();
    let second = Node::new();

    parent.set("k", first.clone()).unwrap();
    parent.set("k", second.clone()).unwrap();

    assert!(first.parent().is_none());
    assert!(first.name().is_none());
    assert!(second.parent().unwrap().ptr_eq(&parent));
}

#[test]
fn test_reinserting_same_child_keeps_it_adopted() {
    let parent = Node::new();
    let child = Node::new();

    parent.set("k", child.clone()).unwrap();
    parent.set("k", child.clone()).unwrap();

    assert!(child.parent().unwrap().ptr_eq(&parent));
    assert_eq!(child.name().as_deref(), Some("k"));
}

#[test]
fn test_delete_clears_location() {
    let parent = Node::new();
    let child = Node::new();
    parent.set("k", child.clone()).unwrap();

    parent.delete("k").unwrap();

    assert!(child.parent().is_none());
    assert!(child.name().is_none());
}

#[test]
fn test_cyclic_adoption_is_refused() {
    let a = Node::new();
    let b = Node::new();
    a.set("b", b.clone()).unwrap();

    let err = b.set("a", a.clone()).unwrap_err();
    assert!(matches!(err, Error::Node(NodeError::CyclicAdoption { ref key }) if key == "a"));
    assert!(a.parent().is_none());

    let err = a.set("self", a.clone()).unwrap_err();
    assert!(matches!(err, Error::Node(NodeError::CyclicAdoption { .. })));
    assert!(a.name().is_none());
}
