//! Behavior composition for node mapping operations.
//!
//! A [`Behavior`] wraps some of the mapping operations of a node. When a node type is
//! built, its behaviors are composed into a [`Plumbing`]: one fixed pipeline per
//! [`Operation`], holding only the behaviors that declared they wrap it, in
//! composition order. Invoking an operation runs the outermost stage first; each stage
//! receives a [`Next`] and decides whether to forward to the inner stages, transform
//! the call or its result, or return an error without forwarding. The raw child
//! storage of the node is the innermost stage and always terminates the pipeline.
//!
//! # Behaviors
//!
//! - [`Adopt`] - parent/name bookkeeping with rollback
//! - [`ChildValidate`] - refuses non-node children
//! - [`Order`] - positional inserts and detach
//! - [`Reference`] - identity index
//! - [`Attributed`] - per-node attribute store
//! - [`Lifecycle`] - lifecycle notifications
//! - [`FixedChildren`] - read-only children built at initialisation
//!
//! # Writing a behavior
//!
//! ```
//! use std::any::Any;
//! use nodal::{
//!     Entry, Node, NodeType, Result,
//!     behavior::{Behavior, Next, Operation},
//! };
//!
//! /// Upper-cases every key on insertion.
//! #[derive(Debug)]
//! struct UpperKeys;
//!
//! impl Behavior for UpperKeys {
//!     fn name(&self) -> &'static str {
//!         "upper_keys"
//!     }
//!
//!     fn wraps(&self) -> &'static [Operation] {
//!         &[Operation::Set]
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
//!         next.set(node, key.to_uppercase(), entry)
//!     }
//! }
//!
//! let shouting = NodeType::builder("Shouting")
//!     .behavior(UpperKeys)
//!     .allow_non_node_children(true)
//!     .build()?;
//! let node = shouting.create();
//! node.set("key", 1)?;
//! assert_eq!(node.keys(), vec!["KEY"]);
//! # Ok::<(), nodal::Error>(())
//! ```

use std::{any::Any, fmt, rc::Rc};

use tracing::trace;

use crate::{Entry, Node, Result};

pub mod adopt;
pub mod attributed;
pub mod fixed;
pub mod lifecycle;
pub mod order;
pub mod reference;
pub mod validate;

pub use adopt::Adopt;
pub use attributed::Attributed;
pub use fixed::FixedChildren;
pub use lifecycle::{
    EventError, EventSink, Lifecycle, LifecycleEvents, NodeEvent, RecordingSink, TracingSink,
    Transition,
};
pub use order::Order;
pub use reference::Reference;
pub use validate::ChildValidate;

/// The mapping operations a behavior can wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Node construction
    Init,
    /// Child lookup
    Get,
    /// Child insertion or replacement
    Set,
    /// Child removal (delete and detach)
    Delete,
    /// Key iteration
    Keys,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::Keys => "keys",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a child is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Plain removal through [`Node::delete`]
    Delete,
    /// Removal to move the node elsewhere, through [`Node::detach`]
    Detach,
}

/// A composable unit wrapping mapping operations of a node.
///
/// Every hook defaults to forwarding unchanged, but only the operations listed by
/// [`Behavior::wraps`] are routed through the behavior at all.
pub trait Behavior: Any + fmt::Debug {
    /// Unique name of the behavior within a node type.
    fn name(&self) -> &'static str;

    /// The operations this behavior intercepts.
    fn wraps(&self) -> &'static [Operation];

    /// Downcasting support, to reach behavior-specific operations.
    fn as_any(&self) -> &dyn Any;

    fn init(&self, node: &Node, next: Next<'_>) {
        next.init(node)
    }

    fn get(&self, node: &Node, key: &str, next: Next<'_>) -> Result<Entry> {
        next.get(node, key)
    }

    fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
        next.set(node, key, entry)
    }

    fn delete(&self, node: &Node, key: &str, removal: Removal, next: Next<'_>) -> Result<Entry> {
        next.delete(node, key, removal)
    }

    fn keys(&self, node: &Node, next: Next<'_>) -> Vec<String> {
        next.keys(node)
    }
}

/// The remaining inner stages of a pipeline.
///
/// Calling one of its methods forwards the operation to the next stage; dropping it
/// without calling anything aborts the inner stages.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Rc<dyn Behavior>],
}

impl<'a> Next<'a> {
    fn new(stages: &'a [Rc<dyn Behavior>]) -> Self {
        Self { stages }
    }

    /// Number of stages left before the raw storage.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }

    fn split(self, operation: Operation) -> Option<(&'a Rc<dyn Behavior>, Next<'a>)> {
        let (stage, rest) = self.stages.split_first()?;
        trace!(behavior = stage.name(), operation = %operation, "entering stage");
        Some((stage, Next::new(rest)))
    }

    pub fn init(self, node: &Node) {
        if let Some((stage, next)) = self.split(Operation::Init) {
            stage.init(node, next);
        }
    }

    pub fn get(self, node: &Node, key: &str) -> Result<Entry> {
        match self.split(Operation::Get) {
            Some((stage, next)) => stage.get(node, key, next),
            None => node.raw_get(key),
        }
    }

    pub fn set(self, node: &Node, key: String, entry: Entry) -> Result<()> {
        match self.split(Operation::Set) {
            Some((stage, next)) => stage.set(node, key, entry, next),
            None => {
                node.raw_set(key, entry);
                Ok(())
            }
        }
    }

    pub fn delete(self, node: &Node, key: &str, removal: Removal) -> Result<Entry> {
        match self.split(Operation::Delete) {
            Some((stage, next)) => stage.delete(node, key, removal, next),
            None => node.raw_delete(key),
        }
    }

    pub fn keys(self, node: &Node) -> Vec<String> {
        match self.split(Operation::Keys) {
            Some((stage, next)) => stage.keys(node, next),
            None => node.raw_keys(),
        }
    }
}

/// The composed behaviors of a node type, one pipeline per operation.
#[derive(Default)]
pub struct Plumbing {
    behaviors: Vec<Rc<dyn Behavior>>,
    init: Vec<Rc<dyn Behavior>>,
    get: Vec<Rc<dyn Behavior>>,
    set: Vec<Rc<dyn Behavior>>,
    delete: Vec<Rc<dyn Behavior>>,
    keys: Vec<Rc<dyn Behavior>>,
}

impl Plumbing {
    /// Composes `behaviors`, outermost first, into per-operation pipelines.
    pub fn compose(behaviors: Vec<Rc<dyn Behavior>>) -> Self {
        let mut plumbing = Plumbing::default();
        for behavior in &behaviors {
            for operation in behavior.wraps() {
                plumbing
                    .pipeline_mut(*operation)
                    .push(Rc::clone(behavior));
            }
        }
        plumbing.behaviors = behaviors;
        plumbing
    }

    /// All composed behaviors, outermost first.
    pub fn behaviors(&self) -> &[Rc<dyn Behavior>] {
        &self.behaviors
    }

    /// The pipeline of `operation`, outermost first.
    pub fn pipeline(&self, operation: Operation) -> &[Rc<dyn Behavior>] {
        match operation {
            Operation::Init => &self.init,
            Operation::Get => &self.get,
            Operation::Set => &self.set,
            Operation::Delete => &self.delete,
            Operation::Keys => &self.keys,
        }
    }

    fn pipeline_mut(&mut self, operation: Operation) -> &mut Vec<Rc<dyn Behavior>> {
        match operation {
            Operation::Init => &mut self.init,
            Operation::Get => &mut self.get,
            Operation::Set => &mut self.set,
            Operation::Delete => &mut self.delete,
            Operation::Keys => &mut self.keys,
        }
    }

    /// Returns the composed behavior of type `B`, if any.
    pub fn find<B: Behavior>(&self) -> Option<&B> {
        self.behaviors
            .iter()
            .find_map(|behavior| behavior.as_any().downcast_ref::<B>())
    }

    /// Returns true if a behavior named `name` is composed.
    pub fn contains(&self, name: &str) -> bool {
        self.behaviors.iter().any(|behavior| behavior.name() == name)
    }

    pub(crate) fn init(&self, node: &Node) {
        Next::new(&self.init).init(node)
    }

    pub(crate) fn get(&self, node: &Node, key: &str) -> Result<Entry> {
        Next::new(&self.get).get(node, key)
    }

    pub(crate) fn set(&self, node: &Node, key: String, entry: Entry) -> Result<()> {
        Next::new(&self.set).set(node, key, entry)
    }

    pub(crate) fn delete(&self, node: &Node, key: &str, removal: Removal) -> Result<Entry> {
        Next::new(&self.delete).delete(node, key, removal)
    }

    pub(crate) fn keys(&self, node: &Node) -> Vec<String> {
        Next::new(&self.keys).keys(node)
    }
}

impl fmt::Debug for Plumbing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.behaviors.iter().map(|behavior| behavior.name()))
            .finish()
    }
}
