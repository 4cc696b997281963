//! Node trees with composable mapping behaviors.
//!
//! A [`Node`] is a cheap handle to a named entry in a tree. It exposes mapping
//! semantics over its ordered children: [`Node::get`], [`Node::set`],
//! [`Node::delete`], [`Node::keys`] and friends. Every mapping operation is routed
//! through the behavior chain of the node's [`NodeType`] before it reaches the raw
//! child storage, so what a call actually does depends on the composed behaviors.
//!
//! # Ownership
//!
//! Parents own their children. A child holds a [`WeakNode`] to its parent, so a tree
//! is released as soon as the last handle to its root is dropped.
//!
//! # Usage
//!
//! ```
//! use nodal::Node;
//!
//! let root = Node::new();
//! root.set("a", Node::new())?;
//! root.get_node("a")?.set("b", Node::new())?;
//!
//! let b = root.get_node("a")?.get_node("b")?;
//! assert_eq!(b.path(), vec!["a", "b"]);
//! assert!(b.root().ptr_eq(&root));
//! # Ok::<(), nodal::Error>(())
//! ```

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    Result,
    access::{AttributeAccess, Mapping},
    alias::Aliases,
    attributes::NodeAttributes,
    behavior::{Attributed, Order, Reference, Removal, order::Placement},
};

pub mod capability;
mod entry;
pub mod errors;
mod node_type;

pub use capability::Capability;
pub use entry::{Entry, NodeFactory};
pub use errors::NodeError;
pub use node_type::{NodeType, NodeTypeBuilder};

/// A handle to a node in a tree.
///
/// Cloning a `Node` clones the handle, not the node: both handles refer to the same
/// node, compare with [`Node::ptr_eq`].
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

/// Weak reference to a Node.
///
/// Children refer to their parent through a `WeakNode`, and the identity index refers
/// to the nodes it resolves through `WeakNode`s, so neither keeps a node alive.
#[derive(Clone, Default)]
pub struct WeakNode {
    inner: Weak<NodeInner>,
}

struct NodeInner {
    node_type: NodeType,
    identity: Uuid,
    state: RefCell<NodeState>,
}

struct NodeState {
    name: Option<String>,
    parent: WeakNode,
    children: IndexMap<String, Entry>,
    allow_non_node_children: bool,
    aliases: Option<Aliases>,
    root: bool,
    /// Identity index, only populated on index holders
    index: HashMap<Uuid, WeakNode>,
    attrs: Option<NodeAttributes>,
    /// Position consumed by the next raw insert of a new key
    insert_position: Option<usize>,
}

impl Node {
    /// Creates a node of the standard type (child validation and adoption).
    pub fn new() -> Self {
        NodeType::standard().create()
    }

    /// Creates a node of the given type, running its initialisation chain.
    pub fn with_type(node_type: &NodeType) -> Self {
        let node = Node {
            inner: Rc::new(NodeInner {
                node_type: node_type.clone(),
                identity: Uuid::new_v4(),
                state: RefCell::new(NodeState {
                    name: None,
                    parent: WeakNode::default(),
                    children: IndexMap::new(),
                    allow_non_node_children: node_type.allow_non_node_children(),
                    aliases: None,
                    root: node_type.is_root(),
                    index: HashMap::new(),
                    attrs: None,
                    insert_position: None,
                }),
            }),
        };
        node_type.plumbing().init(&node);
        node
    }

    /// Returns the type this node was created from.
    pub fn node_type(&self) -> &NodeType {
        &self.inner.node_type
    }

    /// Returns the identity assigned to this node at creation.
    pub fn identity(&self) -> Uuid {
        self.inner.identity
    }

    /// Returns the name of this node within its parent.
    pub fn name(&self) -> Option<String> {
        self.inner.state.borrow().name.clone()
    }

    /// Sets the name of this node.
    ///
    /// Names are normally assigned by adoption; ordering inserts require the caller to
    /// name the node beforehand.
    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.state.borrow_mut().name = Some(name.into());
    }

    /// Returns the parent of this node, if it has one.
    pub fn parent(&self) -> Option<Node> {
        self.inner.state.borrow().parent.upgrade()
    }

    /// Returns the names from the outermost ancestor down to this node.
    ///
    /// Unnamed nodes (usually the root) contribute no component.
    pub fn path(&self) -> Vec<String> {
        let mut path: Vec<String> = self.lineage().filter_map(|node| node.name()).collect();
        path.reverse();
        path
    }

    /// Returns the nearest ancestor marked as root, or the outermost ancestor.
    pub fn root(&self) -> Node {
        let mut node = self.clone();
        while !node.is_root() {
            match node.parent() {
                Some(parent) => node = parent,
                None => break,
            }
        }
        node
    }

    /// Returns true if this node is marked as a root.
    pub fn is_root(&self) -> bool {
        self.inner.state.borrow().root
    }

    /// Marks or unmarks this node as a root.
    pub fn set_root(&self, root: bool) {
        self.inner.state.borrow_mut().root = root;
    }

    pub fn allow_non_node_children(&self) -> bool {
        self.inner.state.borrow().allow_non_node_children
    }

    pub fn set_allow_non_node_children(&self, allow: bool) {
        self.inner.state.borrow_mut().allow_non_node_children = allow;
    }

    pub fn aliases(&self) -> Option<Aliases> {
        self.inner.state.borrow().aliases.clone()
    }

    /// Configures the key aliases of this node. `None` disables translation.
    pub fn set_aliases(&self, aliases: Option<Aliases>) {
        self.inner.state.borrow_mut().aliases = aliases;
    }

    /// Returns true if both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a weak handle that does not keep this node alive.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ===== Mapping operations =====

    /// Gets the child stored under `key`.
    pub fn get(&self, key: &str) -> Result<Entry> {
        let key = self.internal_key(key)?;
        self.node_type().plumbing().get(self, &key)
    }

    /// Gets the child stored under `key`, requiring it to be a node.
    pub fn get_node(&self, key: &str) -> Result<Node> {
        match self.get(key)? {
            Entry::Node(node) => Ok(node),
            other => Err(NodeError::InvalidChildType {
                key: key.to_string(),
                reason: format!("expected a node, found {}", other.kind()),
            }
            .into()),
        }
    }

    /// Stores `value` under `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Entry>) -> Result<()> {
        let key = self.internal_key(&key.into())?;
        self.dispatch_set(key, value.into())
    }

    /// Removes and returns the child stored under `key`.
    pub fn delete(&self, key: &str) -> Result<Entry> {
        let key = self.internal_key(key)?;
        self.dispatch_delete(&key, Removal::Delete)
    }

    /// Returns the keys of all children in order.
    pub fn keys(&self) -> Vec<String> {
        let keys = self.node_type().plumbing().keys(self);
        match self.aliases() {
            Some(aliases) => {
                let aliaser = aliases.resolve(self);
                keys.iter().filter_map(|key| aliaser.alias(key)).collect()
            }
            None => keys,
        }
    }

    /// Returns all children in key order.
    pub fn values(&self) -> Result<Vec<Entry>> {
        self.keys().iter().map(|key| self.get(key)).collect()
    }

    /// Returns all `(key, child)` pairs in key order.
    pub fn items(&self) -> Result<Vec<(String, Entry)>> {
        self.keys()
            .into_iter()
            .map(|key| {
                let entry = self.get(&key)?;
                Ok((key, entry))
            })
            .collect()
    }

    /// Returns true if a child is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the child under `key`, storing `default` first if it is absent.
    ///
    /// The insertion goes through the full `set` chain, so adoption and validation
    /// apply to the default exactly as they would to a regular insert.
    pub fn get_or_set_default(&self, key: &str, default: impl Into<Entry>) -> Result<Entry> {
        match self.get(key) {
            Err(crate::Error::Node(NodeError::KeyNotFound { .. })) => {
                let default = default.into();
                self.set(key, default.clone())?;
                Ok(default)
            }
            other => other,
        }
    }

    /// Returns the children matching `capability`, in key order.
    pub fn filtered_values(&self, capability: &Capability) -> Result<Vec<Entry>> {
        Ok(self
            .values()?
            .into_iter()
            .filter(|entry| capability.check(entry))
            .collect())
    }

    /// Returns an adapter exposing this node's children through named accessors.
    pub fn as_attribute_access(&self) -> AttributeAccess<Node> {
        AttributeAccess::new(self.clone())
    }

    // ===== Behavior-provided operations =====

    /// Inserts `new_node` immediately before `reference`, which must be a child.
    ///
    /// `new_node` must already carry a name. Requires the [`Order`] behavior.
    pub fn insert_before(&self, new_node: &Node, reference: &Node) -> Result<()> {
        self.require::<Order>(Order::NAME, "insert_before")?;
        Order::insert(self, new_node, reference, Placement::Before)
    }

    /// Inserts `new_node` immediately after `reference`, which must be a child.
    ///
    /// `new_node` must already carry a name. Requires the [`Order`] behavior.
    pub fn insert_after(&self, new_node: &Node, reference: &Node) -> Result<()> {
        self.require::<Order>(Order::NAME, "insert_after")?;
        Order::insert(self, new_node, reference, Placement::After)
    }

    /// Removes the child node under `key` from the tree and returns it unparented.
    ///
    /// Requires the [`Order`] behavior.
    pub fn detach(&self, key: &str) -> Result<Node> {
        self.require::<Order>(Order::NAME, "detach")?;
        let key = self.internal_key(key)?;
        Order::detach(self, &key)
    }

    /// Resolves `identity` through the identity index of this node's tree.
    ///
    /// The index consulted is the one of [`Node::index_holder`].
    pub fn node_by_identity(&self, identity: &Uuid) -> Result<Node> {
        self.index_holder()
            .indexed(identity)
            .ok_or_else(|| NodeError::IdentityNotFound {
                identity: *identity,
            })
            .map_err(Into::into)
    }

    /// Returns the node holding the identity index this node is registered in.
    ///
    /// Climbs through ancestors as long as they compose [`Reference`], stopping at a
    /// node marked as root. A parent without the behavior never maintains an index, so
    /// an indexed node below it holds its own.
    pub fn index_holder(&self) -> Node {
        let mut holder = self.clone();
        while !holder.is_root() {
            match holder.parent() {
                Some(parent) if parent.node_type().has_behavior(Reference::NAME) => {
                    holder = parent
                }
                _ => break,
            }
        }
        holder
    }

    /// Returns the identities registered in the index held by this node.
    ///
    /// Only index holders (roots) carry entries.
    pub fn indexed_identities(&self) -> Vec<Uuid> {
        self.inner.state.borrow().index.keys().copied().collect()
    }

    /// Returns the attribute store of this node, creating it on first access.
    ///
    /// Requires the [`Attributed`] behavior.
    pub fn attrs(&self) -> Result<NodeAttributes> {
        let attributed = self.require::<Attributed>(Attributed::NAME, "attrs")?;
        Ok(attributed.attributes(self))
    }

    fn require<B: crate::behavior::Behavior>(
        &self,
        behavior: &'static str,
        operation: &'static str,
    ) -> Result<&B> {
        self.node_type().behavior::<B>().ok_or_else(|| {
            NodeError::MissingBehavior {
                behavior,
                operation,
            }
            .into()
        })
    }

    /// Translates an external key into the key used by the behavior chain.
    fn internal_key(&self, key: &str) -> Result<String> {
        match self.aliases() {
            Some(aliases) => aliases
                .resolve(self)
                .unalias(key)
                .ok_or_else(|| NodeError::KeyNotFound {
                    key: key.to_string(),
                }
                .into()),
            None => Ok(key.to_string()),
        }
    }

    // ===== Chain entry points (internal keys) =====

    pub(crate) fn dispatch_set(&self, key: String, entry: Entry) -> Result<()> {
        self.node_type().plumbing().set(self, key, entry)
    }

    pub(crate) fn dispatch_delete(&self, key: &str, removal: Removal) -> Result<Entry> {
        self.node_type().plumbing().delete(self, key, removal)
    }

    // ===== Raw child storage, the innermost stage of every chain =====

    pub(crate) fn raw_get(&self, key: &str) -> Result<Entry> {
        self.inner
            .state
            .borrow()
            .children
            .get(key)
            .cloned()
            .ok_or_else(|| {
                NodeError::KeyNotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    pub(crate) fn raw_set(&self, key: String, entry: Entry) {
        let mut state = self.inner.state.borrow_mut();
        let position = state.insert_position.take();
        match position {
            Some(index) if !state.children.contains_key(&key) => {
                let index = index.min(state.children.len());
                state.children.shift_insert(index, key, entry);
            }
            _ => {
                state.children.insert(key, entry);
            }
        }
    }

    pub(crate) fn raw_delete(&self, key: &str) -> Result<Entry> {
        self.inner
            .state
            .borrow_mut()
            .children
            .shift_remove(key)
            .ok_or_else(|| {
                NodeError::KeyNotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    pub(crate) fn raw_keys(&self) -> Vec<String> {
        self.inner.state.borrow().children.keys().cloned().collect()
    }

    pub(crate) fn raw_contains(&self, key: &str) -> bool {
        self.inner.state.borrow().children.contains_key(key)
    }

    /// Position of the child stored under `key`, provided it is `child` itself.
    pub(crate) fn child_position(&self, key: &str, child: &Node) -> Option<usize> {
        let state = self.inner.state.borrow();
        let (index, _, entry) = state.children.get_full(key)?;
        match entry {
            Entry::Node(node) if node.ptr_eq(child) => Some(index),
            _ => None,
        }
    }

    /// Direct child nodes, skipping non-node children.
    pub(crate) fn child_nodes(&self) -> Vec<Node> {
        self.inner
            .state
            .borrow()
            .children
            .values()
            .filter_map(|entry| entry.as_node().cloned())
            .collect()
    }

    pub(crate) fn set_insert_position(&self, position: Option<usize>) {
        self.inner.state.borrow_mut().insert_position = position;
    }

    // ===== Location bookkeeping =====

    pub(crate) fn location(&self) -> (Option<String>, WeakNode) {
        let state = self.inner.state.borrow();
        (state.name.clone(), state.parent.clone())
    }

    pub(crate) fn set_location(&self, name: Option<String>, parent: WeakNode) {
        let mut state = self.inner.state.borrow_mut();
        state.name = name;
        state.parent = parent;
    }

    pub(crate) fn clear_location(&self) {
        self.set_location(None, WeakNode::default());
    }

    /// This node followed by its ancestors, innermost first.
    pub(crate) fn lineage(&self) -> impl Iterator<Item = Node> {
        std::iter::successors(Some(self.clone()), Node::parent)
    }

    // ===== Identity index storage =====

    pub(crate) fn indexed(&self, identity: &Uuid) -> Option<Node> {
        self.inner
            .state
            .borrow()
            .index
            .get(identity)
            .and_then(WeakNode::upgrade)
    }

    pub(crate) fn index_insert(&self, node: &Node) {
        self.inner
            .state
            .borrow_mut()
            .index
            .insert(node.identity(), node.downgrade());
    }

    pub(crate) fn index_remove(&self, identity: &Uuid) {
        self.inner.state.borrow_mut().index.remove(identity);
    }

    pub(crate) fn clear_index(&self) {
        self.inner.state.borrow_mut().index.clear();
    }

    // ===== Attribute store slot =====

    pub(crate) fn attrs_slot(&self) -> Option<NodeAttributes> {
        self.inner.state.borrow().attrs.clone()
    }

    pub(crate) fn fill_attrs_slot(&self, attrs: NodeAttributes) {
        self.inner.state.borrow_mut().attrs = Some(attrs);
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Node");
        out.field("type", &self.node_type().name())
            .field("identity", &self.identity());
        if let Ok(state) = self.inner.state.try_borrow() {
            out.field("name", &state.name)
                .field("children", &state.children.keys().collect::<Vec<_>>());
        }
        out.finish()
    }
}

impl Mapping for Node {
    type Item = Entry;

    fn get_item(&self, key: &str) -> Result<Entry> {
        self.get(key)
    }

    fn set_item(&self, key: &str, value: Entry) -> Result<()> {
        self.set(key, value)
    }

    fn delete_item(&self, key: &str) -> Result<Entry> {
        self.delete(key)
    }

    fn item_keys(&self) -> Vec<String> {
        self.keys()
    }
}

impl WeakNode {
    /// Upgrade to a strong reference.
    ///
    /// Returns `None` if the node has already been dropped.
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => f.debug_tuple("WeakNode").field(&node.identity()).finish(),
            None => f.write_str("WeakNode(<dropped>)"),
        }
    }
}
