//! Capability predicates over child entries.
//!
//! Child validation and [`Node::filtered_values`](super::Node::filtered_values) only
//! ever ask one question of a value: does it provide some capability? A [`Capability`]
//! packages that boolean predicate together with a name for diagnostics.

use std::{fmt, rc::Rc};

use super::Entry;

type Predicate = dyn Fn(&Entry) -> bool;

/// A named predicate deciding whether an entry provides a capability.
#[derive(Clone)]
pub struct Capability {
    name: String,
    predicate: Rc<Predicate>,
}

impl Capability {
    /// Entries that are node instances.
    pub fn node() -> Self {
        Self::custom("node", Entry::is_node)
    }

    /// Entries holding plain values.
    pub fn value() -> Self {
        Self::custom("value", |entry: &Entry| entry.as_value().is_some())
    }

    /// Nodes whose type composes the behavior named `behavior`.
    pub fn behavior(behavior: &'static str) -> Self {
        Self::custom(behavior, move |entry: &Entry| {
            entry
                .as_node()
                .is_some_and(|node| node.node_type().has_behavior(behavior))
        })
    }

    /// Nodes created from the node type named `type_name`.
    pub fn node_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::custom(type_name.clone(), move |entry: &Entry| {
            entry
                .as_node()
                .is_some_and(|node| node.node_type().name() == type_name)
        })
    }

    /// A capability decided by an arbitrary predicate.
    pub fn custom(name: impl Into<String>, predicate: impl Fn(&Entry) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            predicate: Rc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `entry` provides this capability.
    pub fn check(&self, entry: &Entry) -> bool {
        (self.predicate)(entry)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.name).finish()
    }
}
