//! Named-accessor view over mappings.
//!
//! [`AttributeAccess`] is a thin adapter exposing a [`Mapping`] through
//! `get_attr`/`set_attr`/`delete_attr`, each forwarding one-for-one to the mapping's
//! own operations.
//!
//! ```
//! use nodal::Node;
//!
//! let folder = Node::new();
//! let access = folder.as_attribute_access();
//! access.set_attr("child", Node::new())?;
//!
//! assert!(folder.get("child")?.is_node());
//! assert!(access.get_attr("child")?.is_node());
//! # Ok::<(), nodal::Error>(())
//! ```

use crate::Result;

/// The mapping operations shared by nodes and attribute stores.
pub trait Mapping {
    type Item;

    fn get_item(&self, key: &str) -> Result<Self::Item>;

    fn set_item(&self, key: &str, value: Self::Item) -> Result<()>;

    fn delete_item(&self, key: &str) -> Result<Self::Item>;

    fn item_keys(&self) -> Vec<String>;
}

/// Exposes a mapping through named accessors.
#[derive(Debug, Clone)]
pub struct AttributeAccess<M> {
    context: M,
}

impl<M: Mapping> AttributeAccess<M> {
    pub fn new(context: M) -> Self {
        Self { context }
    }

    /// The adapted mapping.
    pub fn context(&self) -> &M {
        &self.context
    }

    pub fn get_attr(&self, name: &str) -> Result<M::Item> {
        self.context.get_item(name)
    }

    pub fn set_attr(&self, name: &str, value: impl Into<M::Item>) -> Result<()> {
        self.context.set_item(name, value.into())
    }

    pub fn delete_attr(&self, name: &str) -> Result<M::Item> {
        self.context.delete_item(name)
    }

    pub fn attr_names(&self) -> Vec<String> {
        self.context.item_keys()
    }
}
