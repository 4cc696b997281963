//! Identity index over a node tree.

use std::any::Any;

use tracing::debug;

use super::{Behavior, Next, Operation, Removal};
use crate::{Entry, Node, Result, node::NodeError};

/// Maintains the tree-wide identity index.
///
/// Every node carries a UUID assigned at creation. The index maps those identities to
/// weak node handles and lives on the index holder, the outermost node of the
/// surrounding run of indexed ancestors ([`Node::index_holder`]). Nodes register
/// themselves on creation; attaching a subtree registers every identity in it with
/// the holder, removing one deregisters them and leaves the removed node as the
/// holder of its own subtree's index.
///
/// A node marked as root holds the index of its own subtree; only the marked node
/// itself is registered with an enclosing holder. The same goes for a child whose
/// type does not compose this behavior: it is registered, its children are not.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reference;

impl Reference {
    pub const NAME: &'static str = "reference";

    /// The nodes `node` contributes to an enclosing index.
    pub(crate) fn members(node: &Node) -> Vec<Node> {
        let mut members = Vec::new();
        let mut pending = vec![node.clone()];
        while let Some(member) = pending.pop() {
            if !member.is_root() && member.node_type().has_behavior(Self::NAME) {
                pending.extend(member.child_nodes());
            }
            members.push(member);
        }
        members
    }

    /// Registers the subtree of `child` with the index holder of `parent`.
    pub(crate) fn attach(parent: &Node, child: &Node) {
        let holder = parent.index_holder();
        if !child.is_root() {
            child.clear_index();
        }
        for member in Self::members(child) {
            holder.index_insert(&member);
        }
        debug!(holder = %holder.identity(), identity = %child.identity(), "indexed subtree");
    }

    /// Deregisters the subtree of `child` from the holder of `parent` and makes
    /// `child` the holder of its own subtree.
    pub(crate) fn release(parent: &Node, child: &Node) {
        let holder = parent.index_holder();
        let members = Self::members(child);
        for member in &members {
            holder.index_remove(&member.identity());
        }
        if !child.is_root() {
            child.clear_index();
            for member in &members {
                child.index_insert(member);
            }
        }
        debug!(holder = %holder.identity(), identity = %child.identity(), "released subtree from index");
    }
}

impl Behavior for Reference {
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
        node.index_insert(node);
        next.init(node)
    }

    fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
        let child = match &entry {
            Entry::Node(child) => child.clone(),
            _ => {
                let replaced = node.raw_get(&key).ok().and_then(Entry::into_node);
                next.set(node, key, entry)?;
                if let Some(replaced) = replaced {
                    Self::release(node, &replaced);
                }
                return Ok(());
            }
        };

        let replaced = node.raw_get(&key).ok().and_then(Entry::into_node);
        let reinsert = replaced
            .as_ref()
            .is_some_and(|replaced| replaced.ptr_eq(&child));
        if !reinsert {
            let holder = node.index_holder();
            for member in Self::members(&child) {
                if holder.indexed(&member.identity()).is_some() {
                    return Err(NodeError::DuplicateIdentity {
                        identity: member.identity(),
                    }
                    .into());
                }
            }
        }

        next.set(node, key, entry)?;

        if let Some(replaced) = replaced.filter(|_| !reinsert) {
            Self::release(node, &replaced);
        }
        Self::attach(node, &child);
        Ok(())
    }

    fn delete(&self, node: &Node, key: &str, removal: Removal, next: Next<'_>) -> Result<Entry> {
        let removed = next.delete(node, key, removal)?;
        if let Entry::Node(child) = &removed {
            Self::release(node, child);
        }
        Ok(removed)
    }
}
