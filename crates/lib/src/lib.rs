//!
//! Nodal: hierarchical, mapping-shaped node trees.
//! This library provides a tree of nodes whose cross-cutting behaviors are assembled
//! from small composable units instead of a fixed class hierarchy.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: Named entries in a tree exposing mapping semantics over their
//!   children. Parents own their children; children keep a weak handle to their parent.
//! * **Node types (`node::NodeType`)**: The composed behavior set of a kind of node, fixed when
//!   the type is built.
//! * **Behaviors (`behavior::Behavior`)**: Units wrapping the mapping operations of a node.
//!   Each behavior may run code before or after the next stage, or refuse to forward at all:
//!     * **Adopt (`behavior::Adopt`)**: Keeps parent/name consistent on insertion, with rollback.
//!     * **ChildValidate (`behavior::ChildValidate`)**: Rejects children that are not nodes.
//!     * **Order (`behavior::Order`)**: Positional insert-before/insert-after and detach.
//!     * **Reference (`behavior::Reference`)**: Identity index resolving UUIDs to nodes.
//!     * **Attributed (`behavior::Attributed`)**: Per-node change-tracked attribute store.
//!     * **Lifecycle (`behavior::Lifecycle`)**: Created/added/modified/removed/detached events.
//!     * **FixedChildren (`behavior::FixedChildren`)**: Read-only children built from factories.
//! * **Attributes (`attributes::NodeAttributes`)**: A change-tracked mapping owned by a node.

pub mod access;
pub mod alias;
pub mod attributes;
pub mod behavior;
pub mod config;
pub mod node;
pub mod value;

/// Re-export the `Node` handle for easier access.
pub use node::Node;
pub use node::{Entry, NodeType};
pub use value::Value;

/// Result type used throughout the Nodal library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Nodal library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured tree errors from the node module
    #[error(transparent)]
    Node(node::NodeError),

    /// Structured attribute store errors from the attributes module
    #[error(transparent)]
    Attribute(attributes::AttributeError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Node(_) => "node",
            Error::Attribute(_) => "attributes",
            Error::Config(_) => "config",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a key, identity or reference was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_not_found(),
            Error::Attribute(attr_err) => attr_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a child validation rejection.
    pub fn is_invalid_child(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_invalid_child(),
            _ => false,
        }
    }

    /// Check if this error was raised by a mutation of a fixed child set.
    pub fn is_read_only(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_read_only(),
            _ => false,
        }
    }

    /// Check if this error is a name, identity or placement conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is an attribute whitelist violation.
    pub fn is_not_allowed(&self) -> bool {
        match self {
            Error::Attribute(attr_err) => attr_err.is_not_allowed(),
            _ => false,
        }
    }

    /// Check if this error is node-related.
    pub fn is_node_error(&self) -> bool {
        matches!(self, Error::Node(_))
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
