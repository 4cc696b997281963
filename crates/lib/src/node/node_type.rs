//! Node types: the composed behavior set of a kind of node.
//!
//! A [`NodeType`] is built once, through [`NodeType::builder`] or from a
//! [`NodeTypeConfig`](crate::config::NodeTypeConfig), and shared by every node created
//! from it. The behavior order given to the builder is the order in which each
//! operation's pipeline runs, outermost first.

use std::{fmt, rc::Rc};

use super::{Node, NodeFactory};
use crate::{
    Result,
    behavior::{Adopt, Behavior, ChildValidate, Lifecycle, Operation, Plumbing},
    config::ConfigError,
};

thread_local! {
    static STANDARD: NodeType = NodeType::assemble(
        "Node",
        vec![Rc::new(ChildValidate::default()) as Rc<dyn Behavior>, Rc::new(Adopt)],
        false,
        false,
    );
    static BASE: NodeType = NodeType::assemble("BaseNode", Vec::new(), false, false);
}

/// The composed behavior set shared by all nodes of one kind.
#[derive(Clone)]
pub struct NodeType {
    inner: Rc<NodeTypeInner>,
}

struct NodeTypeInner {
    name: String,
    plumbing: Plumbing,
    allow_non_node_children: bool,
    root: bool,
}

impl NodeType {
    /// Starts building a node type named `name`.
    pub fn builder(name: impl Into<String>) -> NodeTypeBuilder {
        NodeTypeBuilder {
            name: name.into(),
            behaviors: Vec::new(),
            allow_non_node_children: false,
            root: false,
        }
    }

    /// A node type without any behaviors: the bare core mapping.
    pub fn base() -> Self {
        BASE.with(Clone::clone)
    }

    /// The default node type: child validation followed by adoption.
    pub fn standard() -> Self {
        STANDARD.with(Clone::clone)
    }

    fn assemble(
        name: &str,
        behaviors: Vec<Rc<dyn Behavior>>,
        allow_non_node_children: bool,
        root: bool,
    ) -> Self {
        NodeType {
            inner: Rc::new(NodeTypeInner {
                name: name.to_string(),
                plumbing: Plumbing::compose(behaviors),
                allow_non_node_children,
                root,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn plumbing(&self) -> &Plumbing {
        &self.inner.plumbing
    }

    /// Default for the per-node `allow_non_node_children` flag.
    pub fn allow_non_node_children(&self) -> bool {
        self.inner.allow_non_node_children
    }

    /// Whether nodes of this type are marked as roots.
    pub fn is_root(&self) -> bool {
        self.inner.root
    }

    /// Returns the composed behavior of type `B`, if any.
    pub fn behavior<B: Behavior>(&self) -> Option<&B> {
        self.inner.plumbing.find::<B>()
    }

    /// Returns true if a behavior named `name` is composed into this type.
    pub fn has_behavior(&self, name: &str) -> bool {
        self.inner.plumbing.contains(name)
    }

    /// Creates a new node of this type.
    pub fn create(&self) -> Node {
        Node::with_type(self)
    }

    /// Returns a factory creating nodes of this type.
    pub fn factory(&self) -> NodeFactory {
        NodeFactory::new(self.clone())
    }

    pub fn ptr_eq(&self, other: &NodeType) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.inner.name)
            .field("plumbing", &self.inner.plumbing)
            .field("allow_non_node_children", &self.inner.allow_non_node_children)
            .field("root", &self.inner.root)
            .finish()
    }
}

/// Builder for [`NodeType`].
///
/// ```
/// use nodal::{NodeType, behavior::{Adopt, ChildValidate, Order}};
///
/// let folder = NodeType::builder("Folder")
///     .behavior(ChildValidate::default())
///     .behavior(Adopt)
///     .behavior(Order)
///     .build()?;
/// assert!(folder.has_behavior("order"));
/// # Ok::<(), nodal::Error>(())
/// ```
pub struct NodeTypeBuilder {
    name: String,
    behaviors: Vec<Rc<dyn Behavior>>,
    allow_non_node_children: bool,
    root: bool,
}

impl NodeTypeBuilder {
    /// Appends a behavior. Earlier behaviors wrap later ones.
    pub fn behavior(mut self, behavior: impl Behavior) -> Self {
        self.behaviors.push(Rc::new(behavior));
        self
    }

    /// Appends an already shared behavior.
    pub fn shared_behavior(mut self, behavior: Rc<dyn Behavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Sets the default for the per-node `allow_non_node_children` flag.
    pub fn allow_non_node_children(mut self, allow: bool) -> Self {
        self.allow_non_node_children = allow;
        self
    }

    /// Marks nodes of this type as roots (and thereby identity index holders).
    pub fn root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Validates the composition and builds the node type.
    ///
    /// # Errors
    /// - [`ConfigError::DuplicateBehavior`] if a behavior is composed twice
    /// - [`ConfigError::InvalidOrder`] if child validation would run after adoption, or
    ///   if a behavior wrapping set or delete is composed outside [`Lifecycle`], whose
    ///   notifications must only fire once the whole pipeline has succeeded
    pub fn build(self) -> Result<NodeType> {
        for (i, behavior) in self.behaviors.iter().enumerate() {
            if self.behaviors[..i]
                .iter()
                .any(|earlier| earlier.name() == behavior.name())
            {
                return Err(ConfigError::DuplicateBehavior {
                    name: behavior.name().to_string(),
                }
                .into());
            }
        }

        let position = |name: &str| self.behaviors.iter().position(|b| b.name() == name);
        let validate = position(ChildValidate::NAME);
        let adopt = position(Adopt::NAME);
        if matches!((validate, adopt), (Some(validate), Some(adopt)) if validate > adopt) {
            return Err(ConfigError::InvalidOrder {
                reason: format!(
                    "'{}' must be composed before '{}' in node type '{}'",
                    ChildValidate::NAME,
                    Adopt::NAME,
                    self.name
                ),
            }
            .into());
        }

        if let Some(lifecycle) = position(Lifecycle::NAME) {
            let outer = self.behaviors[..lifecycle].iter().find(|behavior| {
                behavior
                    .wraps()
                    .iter()
                    .any(|operation| matches!(operation, Operation::Set | Operation::Delete))
            });
            if let Some(outer) = outer {
                return Err(ConfigError::InvalidOrder {
                    reason: format!(
                        "'{}' wraps set or delete outside '{}' in node type '{}'",
                        outer.name(),
                        Lifecycle::NAME,
                        self.name
                    ),
                }
                .into());
            }
        }

        Ok(NodeType::assemble(
            &self.name,
            self.behaviors,
            self.allow_non_node_children,
            self.root,
        ))
    }
}
