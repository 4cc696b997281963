//! Change-tracked attribute stores.
//!
//! A [`NodeAttributes`] holds arbitrary key/value data for one node, separate from the
//! node's children. Stores are created lazily by the
//! [`Attributed`](crate::behavior::Attributed) behavior and live as long as their owner.
//!
//! Writes set the monotonic [`changed`](NodeAttributes::changed) flag and, when the
//! owner's type composes [`Lifecycle`](crate::behavior::Lifecycle), emit a `modified`
//! notification on the owner. With an alias whitelist configured, reads and writes of
//! keys outside the whitelist fail with [`AttributeError::NotAllowed`].
//!
//! ```
//! use nodal::{NodeType, behavior::Attributed};
//!
//! let node_type = NodeType::builder("Document").behavior(Attributed::new()).build()?;
//! let doc = node_type.create();
//!
//! let attrs = doc.attrs()?;
//! assert!(!attrs.changed());
//! attrs.set("title", "Report")?;
//! assert!(attrs.changed());
//! assert_eq!(attrs.get("title")?, "Report");
//! # Ok::<(), nodal::Error>(())
//! ```

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use indexmap::IndexMap;

use crate::{
    Node, Result, Value,
    access::{AttributeAccess, Mapping},
    alias::{Aliases, DictAliaser},
    behavior::Lifecycle,
    node::WeakNode,
};

pub mod errors;

pub use errors::AttributeError;

/// The attribute store of a node.
///
/// Cloning the store clones the handle; all clones share storage and the `changed` flag.
#[derive(Clone)]
pub struct NodeAttributes {
    inner: Rc<AttributesInner>,
}

struct AttributesInner {
    owner: WeakNode,
    storage: RefCell<IndexMap<String, Value>>,
    changed: Cell<bool>,
    aliases: Option<Aliases>,
}

impl NodeAttributes {
    pub(crate) fn new(owner: &Node, aliases: Option<Aliases>) -> Self {
        Self {
            inner: Rc::new(AttributesInner {
                owner: owner.downgrade(),
                storage: RefCell::new(IndexMap::new()),
                changed: Cell::new(false),
                aliases,
            }),
        }
    }

    /// Returns the node this store belongs to, if it is still alive.
    pub fn owner(&self) -> Option<Node> {
        self.inner.owner.upgrade()
    }

    /// Returns true once any write has modified the store. Never reset.
    pub fn changed(&self) -> bool {
        self.inner.changed.get()
    }

    pub fn aliases(&self) -> Option<&Aliases> {
        self.inner.aliases.as_ref()
    }

    /// Gets the attribute stored under `key`.
    pub fn get(&self, key: &str) -> Result<Value> {
        let internal = self.internal_key(key)?;
        self.inner
            .storage
            .borrow()
            .get(&internal)
            .cloned()
            .ok_or_else(|| {
                AttributeError::KeyNotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    /// Stores `value` under `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let internal = self.internal_key(&key)?;
        let value = value.into();
        let old = self
            .inner
            .storage
            .borrow_mut()
            .insert(internal, value.clone());
        self.inner.changed.set(true);
        self.notify_modified(&key, old, Some(value));
        Ok(())
    }

    /// Removes and returns the attribute stored under `key`.
    pub fn delete(&self, key: &str) -> Result<Value> {
        let internal = self.internal_key(key)?;
        let old = self
            .inner
            .storage
            .borrow_mut()
            .shift_remove(&internal)
            .ok_or_else(|| AttributeError::KeyNotFound {
                key: key.to_string(),
            })?;
        self.inner.changed.set(true);
        self.notify_modified(key, Some(old.clone()), None);
        Ok(old)
    }

    /// Returns the visible keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        let internal: Vec<String> = self.inner.storage.borrow().keys().cloned().collect();
        match self.aliaser() {
            Some(aliaser) => internal
                .iter()
                .filter_map(|key| aliaser.alias(key))
                .collect(),
            None => internal,
        }
    }

    /// Returns all visible `(key, value)` pairs in insertion order.
    pub fn items(&self) -> Vec<(String, Value)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).ok().map(|value| (key, value)))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exports the visible attributes as a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let visible: IndexMap<String, Value> = self.items().into_iter().collect();
        Ok(serde_json::to_value(visible)?)
    }

    /// Returns an adapter exposing the store through named accessors.
    pub fn as_attribute_access(&self) -> AttributeAccess<NodeAttributes> {
        AttributeAccess::new(self.clone())
    }

    fn aliaser(&self) -> Option<Rc<DictAliaser>> {
        let aliases = self.inner.aliases.as_ref()?;
        match (aliases, self.owner()) {
            (Aliases::Static(aliaser), _) => Some(Rc::clone(aliaser)),
            (aliases, Some(owner)) => Some(aliases.resolve(&owner)),
            // A resolver without its owner whitelists nothing
            (Aliases::Resolver(_), None) => Some(Rc::new(DictAliaser::new(
                std::iter::empty::<(String, String)>(),
            ))),
        }
    }

    fn internal_key(&self, key: &str) -> Result<String> {
        match self.aliaser() {
            Some(aliaser) => aliaser.unalias(key).ok_or_else(|| {
                AttributeError::NotAllowed {
                    key: key.to_string(),
                }
                .into()
            }),
            None => Ok(key.to_string()),
        }
    }

    fn notify_modified(&self, key: &str, old: Option<Value>, new: Option<Value>) {
        let Some(owner) = self.owner() else {
            return;
        };
        if let Some(lifecycle) = owner.node_type().behavior::<Lifecycle>() {
            lifecycle.notify_modified(&owner, key, old, new);
        }
    }
}

impl fmt::Debug for NodeAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("NodeAttributes");
        out.field("changed", &self.changed());
        if let Ok(storage) = self.inner.storage.try_borrow() {
            out.field("storage", &*storage);
        }
        out.finish()
    }
}

impl Mapping for NodeAttributes {
    type Item = Value;

    fn get_item(&self, key: &str) -> Result<Value> {
        self.get(key)
    }

    fn set_item(&self, key: &str, value: Value) -> Result<()> {
        self.set(key, value)
    }

    fn delete_item(&self, key: &str) -> Result<Value> {
        self.delete(key)
    }

    fn item_keys(&self) -> Vec<String> {
        self.keys()
    }
}
