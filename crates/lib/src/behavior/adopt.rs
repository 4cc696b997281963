//! Adoption: parent/name bookkeeping for inserted nodes.

use std::any::Any;

use tracing::debug;

use super::{Behavior, Next, Operation, Removal};
use crate::{Entry, Node, Result, node::NodeError};

/// Keeps a child's parent and name consistent with where it is stored.
///
/// On insertion of a node, the node's name becomes the key and its parent becomes the
/// inserting node before the call is forwarded. If any inner stage fails, the node's
/// previous name and parent are restored before the error is returned, so a rejected
/// insert never leaves a half-adopted node behind. Removal clears the location again.
///
/// A node is stored in at most one place. Inserting a node that is still stored in
/// another parent, or under another key of the same parent, fails with
/// [`NodeError::AlreadyAttached`]; delete or detach it first to move it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adopt;

impl Adopt {
    pub const NAME: &'static str = "adopt";
}

impl Behavior for Adopt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Set, Operation::Delete]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
        let replaced = node.raw_get(&key).ok().and_then(Entry::into_node);
        let child = match &entry {
            Entry::Node(child) => child.clone(),
            _ => {
                next.set(node, key, entry)?;
                if let Some(replaced) = replaced {
                    replaced.clear_location();
                }
                return Ok(());
            }
        };

        if node.lineage().any(|ancestor| ancestor.ptr_eq(&child)) {
            return Err(NodeError::CyclicAdoption { key }.into());
        }

        let (old_name, old_parent) = child.location();
        if let (Some(name), Some(parent)) = (&old_name, old_parent.upgrade()) {
            let stored = parent.child_position(name, &child).is_some();
            if stored && !(parent.ptr_eq(node) && *name == key) {
                return Err(NodeError::AlreadyAttached {
                    key,
                    name: name.clone(),
                }
                .into());
            }
        }
        child.set_location(Some(key.clone()), node.downgrade());

        match next.set(node, key.clone(), entry) {
            Ok(()) => {
                debug!(key = %key, identity = %child.identity(), "adopted node");
                if let Some(replaced) = replaced.filter(|replaced| !replaced.ptr_eq(&child)) {
                    replaced.clear_location();
                }
                Ok(())
            }
            Err(err) => {
                debug!(key = %key, identity = %child.identity(), error = %err, "rolling back adoption");
                child.set_location(old_name, old_parent);
                Err(err)
            }
        }
    }

    fn delete(&self, node: &Node, key: &str, removal: Removal, next: Next<'_>) -> Result<Entry> {
        let removed = next.delete(node, key, removal)?;
        if let Entry::Node(child) = &removed {
            child.clear_location();
        }
        Ok(removed)
    }
}
