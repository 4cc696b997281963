//! Child entries stored in a node's mapping.

use std::fmt;

use super::{Node, NodeType};
use crate::Value;

/// A value stored under a key of a node.
///
/// Nodes hold other nodes as children. Nodes that allow non-node children may also
/// hold plain [`Value`]s, or [`NodeFactory`]s which stand for a node type rather than
/// a node instance.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A child node
    Node(Node),
    /// Plain data
    Value(Value),
    /// A node type, not an instance
    Factory(NodeFactory),
}

impl Entry {
    /// Returns true if this entry is a node instance
    pub fn is_node(&self) -> bool {
        matches!(self, Entry::Node(_))
    }

    /// Returns true if this entry is a node type rather than an instance
    pub fn is_factory(&self) -> bool {
        matches!(self, Entry::Factory(_))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Entry::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Entry::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Short description of the entry kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Node(_) => "node",
            Entry::Value(_) => "value",
            Entry::Factory(_) => "node type",
        }
    }
}

/// Nodes compare by identity, values structurally, factories by node type.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Entry::Node(a), Entry::Node(b)) => a.ptr_eq(b),
            (Entry::Value(a), Entry::Value(b)) => a == b,
            (Entry::Factory(a), Entry::Factory(b)) => a.node_type().ptr_eq(b.node_type()),
            _ => false,
        }
    }
}

impl PartialEq<Value> for Entry {
    fn eq(&self, other: &Value) -> bool {
        self.as_value() == Some(other)
    }
}

impl PartialEq<i64> for Entry {
    fn eq(&self, other: &i64) -> bool {
        self.as_value().is_some_and(|value| value == other)
    }
}

impl PartialEq<i32> for Entry {
    fn eq(&self, other: &i32) -> bool {
        self.as_value().is_some_and(|value| value == other)
    }
}

impl PartialEq<&str> for Entry {
    fn eq(&self, other: &&str) -> bool {
        self.as_value().is_some_and(|value| value == other)
    }
}

impl From<Node> for Entry {
    fn from(node: Node) -> Self {
        Entry::Node(node)
    }
}

impl From<&Node> for Entry {
    fn from(node: &Node) -> Self {
        Entry::Node(node.clone())
    }
}

impl From<NodeFactory> for Entry {
    fn from(factory: NodeFactory) -> Self {
        Entry::Factory(factory)
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(value)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Value(value.into())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::Value(value.into())
    }
}

impl From<i64> for Entry {
    fn from(value: i64) -> Self {
        Entry::Value(value.into())
    }
}

impl From<i32> for Entry {
    fn from(value: i32) -> Self {
        Entry::Value(value.into())
    }
}

impl From<bool> for Entry {
    fn from(value: bool) -> Self {
        Entry::Value(value.into())
    }
}

/// Creates nodes of a fixed type.
///
/// A factory is the tree's notion of a "class": it can be stored as an entry to stand
/// for the type itself, and [`FixedChildren`](crate::behavior::FixedChildren) uses
/// factories to build its children.
#[derive(Clone)]
pub struct NodeFactory {
    node_type: NodeType,
}

impl NodeFactory {
    pub fn new(node_type: NodeType) -> Self {
        Self { node_type }
    }

    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    /// Creates a fresh, unparented node of this factory's type.
    pub fn create(&self) -> Node {
        self.node_type.create()
    }
}

impl fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeFactory")
            .field(&self.node_type.name())
            .finish()
    }
}
