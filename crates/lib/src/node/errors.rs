//! Error types for node tree operations.
//!
//! This module defines structured error types for failures of the composed mapping
//! operations on a node: missing keys, rejected children, ordering against unknown
//! references, identity lookups and mutations of fixed child sets.

use thiserror::Error;
use uuid::Uuid;

/// Structured error types for node tree operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeError {
    /// No child (or alias) exists under the given key
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// Child validation refused the value
    #[error("Invalid child for key '{key}': {reason}")]
    InvalidChildType { key: String, reason: String },

    /// The reference node of an ordering operation is not a child of the target
    #[error("Reference node not found among children: {name}")]
    ReferenceNotFound { name: String },

    /// The identity index of the tree has no entry for the identity
    #[error("No node with identity {identity} in this tree")]
    IdentityNotFound { identity: Uuid },

    /// A mutation was attempted on a structurally fixed child set
    #[error("Read-only children: {operation} is not permitted")]
    ReadOnlyViolation { operation: String },

    /// An ordering insert used a name that is already taken
    #[error("Key already contained in node: {key}")]
    DuplicateKey { key: String },

    /// The identity index already holds a node with this identity
    #[error("Node with identity {identity} is already contained in this tree")]
    DuplicateIdentity { identity: Uuid },

    /// The node is still stored under another key or in another parent
    #[error("Cannot store node under '{key}': already attached as '{name}'")]
    AlreadyAttached { key: String, name: String },

    /// Inserting the node would make it its own ancestor
    #[error("Cannot adopt '{key}': node would become its own ancestor")]
    CyclicAdoption { key: String },

    /// Ordering operations require the inserted node to carry a name
    #[error("Node to insert has no name")]
    UnnamedNode,

    /// The node type does not compose the behavior providing the operation
    #[error("Operation '{operation}' requires the '{behavior}' behavior")]
    MissingBehavior {
        behavior: &'static str,
        operation: &'static str,
    },
}

impl NodeError {
    /// Check if this error is a lookup miss (key, reference or identity)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NodeError::KeyNotFound { .. }
                | NodeError::ReferenceNotFound { .. }
                | NodeError::IdentityNotFound { .. }
        )
    }

    /// Check if this error is a missing key
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, NodeError::KeyNotFound { .. })
    }

    /// Check if this error is a child validation rejection
    pub fn is_invalid_child(&self) -> bool {
        matches!(
            self,
            NodeError::InvalidChildType { .. } | NodeError::CyclicAdoption { .. }
        )
    }

    /// Check if this error is a fixed-children mutation
    pub fn is_read_only(&self) -> bool {
        matches!(self, NodeError::ReadOnlyViolation { .. })
    }

    /// Check if this error is a name, identity or placement conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            NodeError::DuplicateKey { .. }
                | NodeError::DuplicateIdentity { .. }
                | NodeError::AlreadyAttached { .. }
        )
    }

    /// Get the key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            NodeError::KeyNotFound { key }
            | NodeError::InvalidChildType { key, .. }
            | NodeError::DuplicateKey { key }
            | NodeError::AlreadyAttached { key, .. }
            | NodeError::CyclicAdoption { key } => Some(key),
            _ => None,
        }
    }
}

// Conversion from NodeError to the main Error type
impl From<NodeError> for crate::Error {
    fn from(err: NodeError) -> Self {
        crate::Error::Node(err)
    }
}
