//! Declarative node type configuration tests

use std::rc::Rc;

use nodal::{
    Error,
    behavior::{Attributed, Lifecycle, RecordingSink, Transition},
    config::{BehaviorConfig, ConfigError, NodeTypeConfig},
};

const FOLDER: &str = r#"{
    "name": "Folder",
    "behaviors": [
        { "type": "lifecycle", "events": { "added": "folder.added" } },
        { "type": "child_validate" },
        { "type": "adopt" },
        { "type": "order" },
        { "type": "reference" },
        { "type": "attributed", "aliases": { "title": "dc:title" } }
    ],
    "root": true
}"#;

#[test]
fn test_parse_folder_config() {
    let config = NodeTypeConfig::from_json(FOLDER).unwrap();

    assert_eq!(config.name, "Folder");
    assert_eq!(config.behaviors.len(), 6);
    assert_eq!(config.behaviors[1], BehaviorConfig::ChildValidate);
    assert!(config.root);
    assert!(!config.allow_non_node_children);
}

#[test]
fn test_build_composes_behaviors_in_order() {
    let sink = RecordingSink::new();
    let folder = NodeTypeConfig::from_json(FOLDER)
        .unwrap()
        .build(Some(sink.clone()))
        .unwrap();

    let names: Vec<&str> = folder
        .plumbing()
        .behaviors()
        .iter()
        .map(|behavior| behavior.name())
        .collect();
    assert_eq!(
        names,
        vec!["lifecycle", "child_validate", "adopt", "order", "reference", "attributed"]
    );
    assert!(folder.is_root());
    assert_eq!(
        folder
            .behavior::<Lifecycle>()
            .unwrap()
            .events()
            .class(Transition::Added),
        "folder.added"
    );

    let root = folder.create();
    let child = folder.create();
    root.set("child", child.clone()).unwrap();

    assert!(root.node_by_identity(&child.identity()).unwrap().ptr_eq(&child));
    assert!(sink.events().iter().any(|e| e.class == "folder.added"));
    assert!(root.attrs().unwrap().set("author", "x").unwrap_err().is_not_allowed());
    assert!(folder.behavior::<Attributed>().unwrap().aliases().is_some());
}

#[test]
fn test_build_without_sink_falls_back_to_tracing() {
    let config = NodeTypeConfig::from_json(
        r#"{"name": "Logged", "behaviors": [{"type": "lifecycle"}, {"type": "adopt"}]}"#,
    )
    .unwrap();

    let logged = config.build(None).unwrap();
    let root = logged.create();
    root.set("child", logged.create()).unwrap();

    assert!(root.contains("child"));
}

#[test]
fn test_invalid_compositions_are_rejected() {
    let duplicate = NodeTypeConfig::from_json(
        r#"{"name": "Twice", "behaviors": [{"type": "adopt"}, {"type": "adopt"}]}"#,
    )
    .unwrap();
    let err = duplicate.build(None).unwrap_err();
    assert!(matches!(&err, Error::Config(e) if e.is_composition_error()));

    let backwards = NodeTypeConfig::from_json(
        r#"{"name": "Backwards", "behaviors": [{"type": "adopt"}, {"type": "child_validate"}]}"#,
    )
    .unwrap();
    let err = backwards.build(None).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::InvalidOrder { .. })));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = NodeTypeConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse { .. })));

    let err = NodeTypeConfig::from_json(r#"{"behaviors": []}"#).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse { ref reason }) if reason.contains("name")));
}

#[test]
fn test_non_node_children_default() {
    let config =
        NodeTypeConfig::from_json(r#"{"name": "Loose", "behaviors": [{"type": "child_validate"}], "allow_non_node_children": true}"#)
            .unwrap();
    let loose = config.build(Some(Rc::new(nodal::behavior::TracingSink))).unwrap();

    let node = loose.create();
    node.set("count", 3).unwrap();
    assert!(node.allow_non_node_children());
}
