//! Lifecycle notifications.
//!
//! The [`Lifecycle`] behavior emits a [`NodeEvent`] to an explicit [`EventSink`] at each
//! transition of a node: creation, being added to a parent, modification, removal and
//! detaching. Notifications are only emitted after the whole pipeline, raw storage
//! included, has succeeded. Delivery is fire-and-forget: a failing sink is logged and
//! never undoes the change that triggered the notification.

use std::{any::Any, cell::RefCell, collections::HashMap, fmt, rc::Rc};

use thiserror::Error;
use tracing::{info, warn};

use super::{Behavior, Next, Operation, Removal};
use crate::{Entry, Node, Result, Value};

/// The transitions a node goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Created,
    Added,
    Modified,
    Removed,
    Detached,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Created,
        Transition::Added,
        Transition::Modified,
        Transition::Removed,
        Transition::Detached,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Created => "created",
            Transition::Added => "added",
            Transition::Modified => "modified",
            Transition::Removed => "removed",
            Transition::Detached => "detached",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps each transition to the notification class identifier used for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvents {
    classes: HashMap<Transition, String>,
}

impl LifecycleEvents {
    /// Overrides the class identifier of `transition`.
    pub fn with(mut self, transition: Transition, class: impl Into<String>) -> Self {
        self.classes.insert(transition, class.into());
        self
    }

    /// Returns the class identifier of `transition`.
    pub fn class(&self, transition: Transition) -> &str {
        self.classes
            .get(&transition)
            .map(String::as_str)
            .unwrap_or_else(|| transition.as_str())
    }
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self {
            classes: Transition::ALL
                .iter()
                .map(|transition| (*transition, format!("node.{}", transition.as_str())))
                .collect(),
        }
    }
}

/// A lifecycle notification.
#[derive(Debug, Clone)]
pub struct NodeEvent {
    pub transition: Transition,
    /// Class identifier from the emitting behavior's [`LifecycleEvents`]
    pub class: String,
    /// The node the transition happened to
    pub node: Node,
    /// Key within the parent (or attribute key for modifications)
    pub key: Option<String>,
    pub old_parent: Option<Node>,
    pub new_parent: Option<Node>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl NodeEvent {
    fn new(transition: Transition, class: &str, node: &Node) -> Self {
        Self {
            transition,
            class: class.to_string(),
            node: node.clone(),
            key: None,
            old_parent: None,
            new_parent: None,
            old_value: None,
            new_value: None,
        }
    }
}

/// Error returned by an [`EventSink`] that failed to deliver a notification.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event delivery failed: {reason}")]
    DeliveryFailed { reason: String },
}

/// Receives lifecycle notifications.
pub trait EventSink: fmt::Debug {
    fn notify(&self, event: &NodeEvent) -> std::result::Result<(), EventError>;
}

/// Sink that logs every notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &NodeEvent) -> std::result::Result<(), EventError> {
        info!(
            class = %event.class,
            identity = %event.node.identity(),
            key = ?event.key,
            "node event"
        );
        Ok(())
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<NodeEvent>>,
}

impl RecordingSink {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.borrow().clone()
    }

    /// The transitions recorded so far, in emission order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.events.borrow().iter().map(|e| e.transition).collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &NodeEvent) -> std::result::Result<(), EventError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Emits lifecycle notifications for the nodes of a type.
///
/// - `created` once the initialisation chain has completed
/// - `added` when a node child has been stored, with old and new parent
/// - `modified` when an attribute is written, or a non-node child is stored or removed
/// - `removed` / `detached` when a node child has been deleted / detached
///
/// No behavior wrapping `set` or `delete` may be composed before it, so that nothing
/// can fail after a notification went out. [`NodeType::builder`](crate::NodeType::builder)
/// refuses such compositions.
pub struct Lifecycle {
    sink: Rc<dyn EventSink>,
    events: LifecycleEvents,
}

impl Lifecycle {
    pub const NAME: &'static str = "lifecycle";

    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self {
            sink,
            events: LifecycleEvents::default(),
        }
    }

    /// Uses custom class identifiers for the notifications.
    pub fn with_events(mut self, events: LifecycleEvents) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &LifecycleEvents {
        &self.events
    }

    /// Emits `modified` for an attribute write on `node`.
    pub fn notify_modified(
        &self,
        node: &Node,
        key: &str,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) {
        let mut event = self.event(Transition::Modified, node);
        event.key = Some(key.to_string());
        event.old_value = old_value;
        event.new_value = new_value;
        self.emit(event);
    }

    fn event(&self, transition: Transition, node: &Node) -> NodeEvent {
        NodeEvent::new(transition, self.events.class(transition), node)
    }

    fn emit(&self, event: NodeEvent) {
        if let Err(err) = self.sink.notify(&event) {
            warn!(
                class = %event.class,
                identity = %event.node.identity(),
                error = %err,
                "lifecycle notification was not delivered"
            );
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("sink", &self.sink)
            .field("events", &self.events)
            .finish()
    }
}

impl Behavior for Lifecycle {
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
        next.init(node);
        self.emit(self.event(Transition::Created, node));
    }

    fn set(&self, node: &Node, key: String, entry: Entry, next: Next<'_>) -> Result<()> {
        let event = match entry.as_node().cloned() {
            Some(child) => {
                let old_parent = child.parent();
                next.set(node, key.clone(), entry)?;

                let mut event = self.event(Transition::Added, &child);
                event.old_parent = old_parent;
                event.new_parent = Some(node.clone());
                event
            }
            None => {
                let old_value = node.raw_get(&key).ok().and_then(Entry::into_value);
                let new_value = entry.as_value().cloned();
                next.set(node, key.clone(), entry)?;

                let mut event = self.event(Transition::Modified, node);
                event.old_value = old_value;
                event.new_value = new_value;
                event
            }
        };
        self.emit(NodeEvent {
            key: Some(key),
            ..event
        });
        Ok(())
    }

    fn delete(&self, node: &Node, key: &str, removal: Removal, next: Next<'_>) -> Result<Entry> {
        let removed = next.delete(node, key, removal)?;
        let event = match &removed {
            Entry::Node(child) => {
                let transition = match removal {
                    Removal::Delete => Transition::Removed,
                    Removal::Detach => Transition::Detached,
                };
                let mut event = self.event(transition, child);
                event.old_parent = Some(node.clone());
                event
            }
            other => {
                let mut event = self.event(Transition::Modified, node);
                event.old_value = other.as_value().cloned();
                event
            }
        };
        self.emit(NodeEvent {
            key: Some(key.to_string()),
            ..event
        });
        Ok(removed)
    }
}
