//! Per-node attribute stores.

use std::any::Any;

use super::{Behavior, Operation};
use crate::{Node, alias::Aliases, attributes::NodeAttributes};

/// Gives each node of the type a lazily created [`NodeAttributes`] store.
///
/// The store is reached through [`Node::attrs`]. Aliases configured here become the
/// whitelist of every store created for the type.
#[derive(Debug, Clone, Default)]
pub struct Attributed {
    aliases: Option<Aliases>,
}

impl Attributed {
    pub const NAME: &'static str = "attributed";

    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts attribute stores to the keys of `aliases`.
    pub fn with_aliases(aliases: impl Into<Aliases>) -> Self {
        Self {
            aliases: Some(aliases.into()),
        }
    }

    pub fn aliases(&self) -> Option<&Aliases> {
        self.aliases.as_ref()
    }

    /// Returns the store of `node`, creating it on first access.
    pub fn attributes(&self, node: &Node) -> NodeAttributes {
        if let Some(attrs) = node.attrs_slot() {
            return attrs;
        }
        let attrs = NodeAttributes::new(node, self.aliases.clone());
        node.fill_attrs_slot(attrs.clone());
        attrs
    }
}

impl Behavior for Attributed {
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
