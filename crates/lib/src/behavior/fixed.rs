//! Fixed, read-only child sets.

use std::any::Any;

use super::{Behavior, Next, Operation, Reference, Removal};
use crate::{
    Entry, Node, Result,
    node::{NodeError, NodeFactory},
};

/// Builds a fixed set of children when a node is created and refuses to change it.
///
/// Children are created from their factories in declaration order and adopted
/// directly, without going through the `set` pipeline. They cannot receive
/// construction arguments, but can read configuration from their parent. Any later
/// `set`, `delete` or `detach` fails with [`NodeError::ReadOnlyViolation`].
#[derive(Debug, Clone, Default)]
pub struct FixedChildren {
    factories: Vec<(String, NodeFactory)>,
}

impl FixedChildren {
    pub const NAME: &'static str = "fixed_children";

    pub fn new<K: Into<String>>(factories: impl IntoIterator<Item = (K, NodeFactory)>) -> Self {
        Self {
            factories: factories
                .into_iter()
                .map(|(key, factory)| (key.into(), factory))
                .collect(),
        }
    }

    /// Appends a child created by `factory` under `key`.
    pub fn child(mut self, key: impl Into<String>, factory: NodeFactory) -> Self {
        self.factories.push((key.into(), factory));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|(key, _)| key.as_str())
    }
}

impl Behavior for FixedChildren {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Init, Operation::Set, Operation::Delete]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn init(&self, node: &Node, next: Next<'_>) {
        next.init(node);
        let indexed = node.node_type().has_behavior(Reference::NAME);
        for (key, factory) in &self.factories {
            let child = factory.create();
            child.set_location(Some(key.clone()), node.downgrade());
            node.raw_set(key.clone(), Entry::Node(child.clone()));
            if indexed {
                Reference::attach(node, &child);
            }
        }
    }

    fn set(&self, _node: &Node, key: String, _entry: Entry, _next: Next<'_>) -> Result<()> {
        Err(NodeError::ReadOnlyViolation {
            operation: format!("set '{key}'"),
        }
        .into())
    }

    fn delete(&self, _node: &Node, key: &str, removal: Removal, _next: Next<'_>) -> Result<Entry> {
        let operation = match removal {
            Removal::Delete => "delete",
            Removal::Detach => "detach",
        };
        Err(NodeError::ReadOnlyViolation {
            operation: format!("{operation} '{key}'"),
        }
        .into())
    }
}
