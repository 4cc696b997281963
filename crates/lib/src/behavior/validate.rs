//! Child validation.

use std::any::Any;

use super::{Behavior, Next, Operation};
use crate::{
    Entry, Node, Result,
    node::{Capability, NodeError},
};

/// Refuses children that do not provide the required capability.
///
/// The check only applies while the target node disallows non-node children
/// (see [`Node::allow_non_node_children`]). Node types (factories) are refused with
/// their own message, before the capability check. Validation runs before forwarding,
/// so a refused value never reaches any inner stage.
#[derive(Debug, Clone)]
pub struct ChildValidate {
    capability: Capability,
}

impl ChildValidate {
    pub const NAME: &'static str = "child_validate";

    /// Validates children against a custom capability instead of "is a node".
    pub fn with_capability(capability: Capability) -> Self {
        Self { capability }
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }
}

impl Default for ChildValidate {
    fn default() -> Self {
        Self::with_capability(Capability::node())
    }
}

impl Behavior for ChildValidate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn wraps(&self) -> &'static [Operation] {
        &[Operation::Set]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
        if !node.allow_non_node_children() {
            if entry.is_factory() {
                return Err(NodeError::InvalidChildType {
                    key,
                    reason: "node types are not allowed as values, insert an instance".to_string(),
                }
                .into());
            }
            if !self.capability.check(&entry) {
                return Err(NodeError::InvalidChildType {
                    key,
                    reason: format!(
                        "non-{} children are not allowed, found {}",
                        self.capability.name(),
                        entry.kind()
                    ),
                }
                .into());
            }
        }
        next.set(node, key, entry)
    }
}
