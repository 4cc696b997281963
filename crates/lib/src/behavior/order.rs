//! Positional insertion and detaching of children.

use std::any::Any;

use tracing::debug;

use super::{Behavior, Operation, Removal};
use crate::{Entry, Node, Result, node::NodeError};

/// Where a node is inserted relative to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Enables [`Node::insert_before`], [`Node::insert_after`] and [`Node::detach`].
///
/// Order is a property of the child mapping itself: an ordered insert records the
/// target position on the node and then stores the child through the regular `set`
/// pipeline, which places a new key at that position. Adoption and validation apply
/// exactly as for any other insert. If the pipeline fails the recorded position is
/// discarded and the child order is unchanged.
///
/// Ordered inserts only add new nodes. To move a node, detach it first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Order;

impl Order {
    pub const NAME: &'static str = "order";

    pub(crate) fn insert(
        node: &Node,
        new_node: &Node,
        reference: &Node,
        placement: Placement,
    ) -> Result<()> {
        let name = new_node.name().ok_or(NodeError::UnnamedNode)?;
        let reference_name = reference.name().unwrap_or_default();
        let position = node
            .child_position(&reference_name, reference)
            .ok_or_else(|| NodeError::ReferenceNotFound {
                name: reference_name.clone(),
            })?;
        if node.raw_contains(&name) {
            return Err(NodeError::DuplicateKey { key: name }.into());
        }

        let position = match placement {
            Placement::Before => position,
            Placement::After => position + 1,
        };
        debug!(key = %name, reference = %reference_name, position, "ordered insert");

        node.set_insert_position(Some(position));
        let result = node.dispatch_set(name, Entry::Node(new_node.clone()));
        node.set_insert_position(None);
        result
    }

    pub(crate) fn detach(node: &Node, key: &str) -> Result<Node> {
        if !node.raw_get(key)?.is_node() {
            return Err(NodeError::InvalidChildType {
                key: key.to_string(),
                reason: "only node children can be detached".to_string(),
            }
            .into());
        }

        let removed = node.dispatch_delete(key, Removal::Detach)?;
        match removed {
            Entry::Node(child) => {
                child.clear_location();
                debug!(key = %key, identity = %child.identity(), "detached node");
                Ok(child)
            }
            other => Err(NodeError::InvalidChildType {
                key: key.to_string(),
                reason: format!("expected a node, found {}", other.kind()),
            }
            .into()),
        }
    }
}

impl Behavior for Order {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn wraps(&self) -> &'static [Operation] {
        &[]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
