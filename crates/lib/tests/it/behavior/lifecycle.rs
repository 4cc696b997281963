use std::{cell::RefCell, rc::Rc};

use nodal::{
    Error, NodeType, Value,
    behavior::{
        Adopt, ChildValidate, EventError, EventSink, Lifecycle, LifecycleEvents, NodeEvent, Order,
        RecordingSink, Reference, Transition,
    },
    config::ConfigError,
};

use crate::helpers::observed_type;

/// Sink that refuses every notification.
#[derive(Debug)]
struct FailingSink;

impl EventSink for FailingSink {
    fn notify(&self, _event: &NodeEvent) -> Result<(), EventError> {
        Err(EventError::DeliveryFailed {
            reason: "sink offline".to_string(),
        })
    }
}

/// Records whether each added node was already resolvable through its tree's index.
#[derive(Debug, Default)]
struct IndexProbe {
    resolved: RefCell<Vec<bool>>,
}

impl EventSink for IndexProbe {
    fn notify(&self, event: &NodeEvent) -> Result<(), EventError> {
        if event.transition == Transition::Added {
            let parent = event.new_parent.as_ref().expect("added without parent");
            let found = parent
                .node_by_identity(&event.node.identity())
                .is_ok_and(|node| node.ptr_eq(&event.node));
            self.resolved.borrow_mut().push(found);
        }
        Ok(())
    }
}

#[test]
fn test_created_on_construction() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());

    let node = node_type.create();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].transition, Transition::Created);
    assert_eq!(events[0].class, "node.created");
    assert!(events[0].node.ptr_eq(&node));
}

#[test]
fn test_added_carries_old_and_new_parent() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());
    let first = node_type.create();
    let second = node_type.create();
    let child = node_type.create();
    first.set("child", child.clone()).unwrap();
    first.detach("child").unwrap();
    child.set_name("child");
    sink.clear();

    second.set("child", child.clone()).unwrap();

    let events = sink.events();
    assert_eq!(sink.transitions(), vec![Transition::Added]);
    assert!(events[0].node.ptr_eq(&child));
    assert!(events[0].old_parent.is_none());
    assert!(events[0].new_parent.as_ref().unwrap().ptr_eq(&second));
    assert_eq!(events[0].key.as_deref(), Some("child"));
}

#[test]
fn test_removed_and_detached() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());
    let parent = node_type.create();
    parent.set("a", node_type.create()).unwrap();
    parent.set("b", node_type.create()).unwrap();
    sink.clear();

    parent.delete("a").unwrap();
    parent.detach("b").unwrap();

    assert_eq!(
        sink.transitions(),
        vec![Transition::Removed, Transition::Detached]
    );
    for event in sink.events() {
        assert!(event.old_parent.as_ref().unwrap().ptr_eq(&parent));
        assert!(event.node.parent().is_none());
    }
}

#[test]
fn test_attribute_writes_emit_modified() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());
    let doc = node_type.create();
    sink.clear();

    let attrs = doc.attrs().unwrap();
    attrs.set("title", "Draft").unwrap();
    attrs.set("title", "Final").unwrap();
    attrs.delete("title").unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.transition == Transition::Modified));
    assert!(events.iter().all(|e| e.node.ptr_eq(&doc)));
    assert_eq!(events[1].key.as_deref(), Some("title"));
    assert_eq!(events[1].old_value, Some(Value::from("Draft")));
    assert_eq!(events[1].new_value, Some(Value::from("Final")));
    assert_eq!(events[2].new_value, None);
}

#[test]
fn test_value_children_emit_modified_on_parent() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());
    let parent = node_type.create();
    parent.set_allow_non_node_children(true);
    sink.clear();

    parent.set("count", 1).unwrap();
    parent.set("count", 2).unwrap();
    parent.delete("count").unwrap();

    let events = sink.events();
    assert_eq!(sink.transitions(), vec![Transition::Modified; 3]);
    assert!(events[0].node.ptr_eq(&parent));
    assert_eq!(events[1].old_value, Some(Value::from(1)));
    assert_eq!(events[1].new_value, Some(Value::from(2)));
    assert_eq!(events[2].old_value, Some(Value::from(2)));
}

#[test]
fn test_failed_operations_emit_nothing() {
    let sink = RecordingSink::new();
    let node_type = observed_type(sink.clone());
    let parent = node_type.create();
    sink.clear();

    assert!(parent.set("k", 42).is_err());
    assert!(parent.delete("missing").is_err());
    assert!(parent.detach("missing").is_err());

    assert!(sink.events().is_empty());
}

#[test]
fn test_delivery_failure_keeps_change() {
    let node_type = observed_type(Rc::new(FailingSink));
    let parent = node_type.create();
    let child = node_type.create();

    parent.set("child", child.clone()).unwrap();
    assert!(child.parent().unwrap().ptr_eq(&parent));

    parent.delete("child").unwrap();
    assert!(!parent.contains("child"));
}

#[test]
fn test_index_updated_before_added() {
    let probe = Rc::new(IndexProbe::default());
    let node_type = observed_type(probe.clone());
    let root = node_type.create();

    root.set("a", node_type.create()).unwrap();
    root.get_node("a")
        .unwrap()
        .set("b", node_type.create())
        .unwrap();

    assert_eq!(*probe.resolved.borrow(), vec![true, true]);
}

#[test]
fn test_custom_event_classes() {
    let sink = RecordingSink::new();
    let events = LifecycleEvents::default()
        .with(Transition::Created, "page.created")
        .with(Transition::Added, "page.added");
    let page_type = NodeType::builder("Page")
        .behavior(Lifecycle::new(sink.clone()).with_events(events))
        .behavior(ChildValidate::default())
        .behavior(Adopt)
        .behavior(Order)
        .behavior(Reference)
        .build()
        .unwrap();

    let page = page_type.create();
    page.set("section", page_type.create()).unwrap();
    page.detach("section").unwrap();

    let classes: Vec<String> = sink.events().into_iter().map(|e| e.class).collect();
    assert_eq!(
        classes,
        vec!["page.created", "page.created", "page.added", "node.detached"]
    );
}

#[test]
fn test_mutating_stage_outside_lifecycle_is_refused() {
    let sink = RecordingSink::new();
    let err = NodeType::builder("Late")
        .behavior(ChildValidate::default())
        .behavior(Lifecycle::new(sink.clone()))
        .behavior(Adopt)
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::InvalidOrder { ref reason }) if reason.contains("child_validate")));

    // Stages that never mutate may sit outside
    let node_type = NodeType::builder("Ordered first")
        .behavior(Order)
        .behavior(Lifecycle::new(sink.clone()))
        .behavior(ChildValidate::default())
        .behavior(Adopt)
        .build()
        .unwrap();
    node_type.create().set("child", node_type.create()).unwrap();
    assert!(sink.transitions().contains(&Transition::Added));
}
