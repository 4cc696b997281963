use std::{any::Any, cell::RefCell, rc::Rc};

use nodal::{
    Entry, Error, Node, NodeType, Result,
    behavior::{Adopt, Behavior, ChildValidate, Next, Operation, Order, Removal},
    config::ConfigError,
    node::NodeError,
};

/// Hides keys starting with an underscore and refuses to delete them.
#[derive(Debug)]
struct HidePrivate;

impl Behavior for HidePrivate {
    fn name(&self) -> &'static str {
        "hide_private"
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Get, Operation::Keys, Operation::Delete]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get(&self, node: &Node, key: &str, next: Next<'_>) -> Result<Entry> {
        hidden(key)?;
        next.get(node, key)
    }

    fn keys(&self, node: &Node, next: Next<'_>) -> Vec<String> {
        next.keys(node)
            .into_iter()
            .filter(|key| !key.starts_with('_'))
            .collect()
    }

    fn delete(&self, node: &Node, key: &str, removal: Removal, next: Next<'_>) -> Result<Entry> {
        hidden(key)?;
        next.delete(node, key, removal)
    }
}

fn hidden(key: &str) -> Result<()> {
    if key.starts_with('_') {
        return Err(NodeError::KeyNotFound {
            key: key.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Logs every init stage it passes through.
#[derive(Debug)]
struct InitLog {
    label: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Behavior for InitLog {
    fn name(&self) -> &'static str {
        self.label
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Init]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn init(&self, node: &Node, next: Next<'_>) {
        self.log.borrow_mut().push(self.label);
        next.init(node);
    }
}

#[test]
fn test_behavior_transforms_get_and_keys() {
    let node_type = NodeType::builder("Private")
        .behavior(HidePrivate)
        .behavior(ChildValidate::default())
        .behavior(Adopt)
        .build()
        .unwrap();
    let node = node_type.create();
    node.set("visible", Node::new()).unwrap();
    node.set("_secret", Node::new()).unwrap();

    assert_eq!(node.keys(), vec!["visible"]);
    assert_eq!(node.len(), 1);
    assert!(!node.contains("_secret"));
    assert!(node.delete("_secret").unwrap_err().is_not_found());
    node.delete("visible").unwrap();
    assert!(node.is_empty());
}

#[test]
fn test_init_runs_outermost_first() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let node_type = NodeType::builder("Logged")
        .behavior(InitLog {
            label: "first",
            log: Rc::clone(&log),
        })
        .behavior(InitLog {
            label: "second",
            log: Rc::clone(&log),
        })
        .build()
        .unwrap();

    node_type.create();
    node_type.create();

    assert_eq!(*log.borrow(), vec!["first", "second", "first", "second"]);
}

#[test]
fn test_duplicate_behavior_is_refused() {
    let err = NodeType::builder("Twice")
        .behavior(Adopt)
        .behavior(Order)
        .behavior(Adopt)
        .build()
        .unwrap_err();

    assert!(err.is_config_error());
    assert!(matches!(err, Error::Config(ConfigError::DuplicateBehavior { ref name }) if name == "adopt"));
}

#[test]
fn test_validation_must_precede_adoption() {
    let err = NodeType::builder("Backwards")
        .behavior(Adopt)
        .behavior(ChildValidate::default())
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::InvalidOrder { .. })));
    assert_eq!(err.module(), "config");
}

#[test]
fn test_presets() {
    let base = NodeType::base();
    assert!(base.plumbing().behaviors().is_empty());
    assert!(base.ptr_eq(&NodeType::base()));

    let standard = NodeType::standard();
    let names: Vec<&str> = standard
        .plumbing()
        .behaviors()
        .iter()
        .map(|behavior| behavior.name())
        .collect();
    assert_eq!(names, vec!["child_validate", "adopt"]);
    assert!(Node::new().node_type().ptr_eq(&standard));
}

#[test]
fn test_base_node_stores_anything_without_adopting() {
    let node = Node::with_type(&NodeType::base());
    let child = Node::new();

    node.set("child", child.clone()).unwrap();
    node.set("value", 5).unwrap();

    assert!(child.parent().is_none());
    assert_eq!(node.keys(), vec!["child", "value"]);
}

#[test]
fn test_behavior_lookup() {
    let node_type = NodeType::builder("Lookup")
        .behavior(ChildValidate::default())
        .behavior(Adopt)
        .build()
        .unwrap();

    assert!(node_type.behavior::<Adopt>().is_some());
    assert!(node_type.behavior::<Order>().is_none());
    assert!(node_type.has_behavior(ChildValidate::NAME));
    assert_eq!(node_type.plumbing().pipeline(Operation::Set).len(), 2);
    assert_eq!(node_type.plumbing().pipeline(Operation::Delete).len(), 1);
}
