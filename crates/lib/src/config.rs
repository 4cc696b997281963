//! Declarative node type configuration.
//!
//! A [`NodeTypeConfig`] describes a node type as data: its name, the ordered list of
//! behaviors to compose, and the per-node defaults. It deserializes from JSON and
//! builds into a [`NodeType`] through the same validation as [`NodeType::builder`].
//!
//! ```
//! use nodal::config::NodeTypeConfig;
//!
//! let config = NodeTypeConfig::from_json(r#"{
//!     "name": "Folder",
//!     "behaviors": [
//!         { "type": "child_validate" },
//!         { "type": "adopt" },
//!         { "type": "order" },
//!         { "type": "reference" }
//!     ]
//! }"#)?;
//! let folder = config.build(None)?;
//! assert!(folder.has_behavior("reference"));
//! # Ok::<(), nodal::Error>(())
//! ```

use std::{collections::HashMap, rc::Rc};

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    NodeType, Result,
    alias::DictAliaser,
    behavior::{
        Adopt, Attributed, ChildValidate, EventSink, Lifecycle, LifecycleEvents, Order, Reference,
        TracingSink, Transition,
    },
};

/// Structured error types for node type configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A behavior was composed more than once
    #[error("Behavior composed more than once: {name}")]
    DuplicateBehavior { name: String },

    /// Behaviors were composed in an order that breaks an invariant
    #[error("Invalid behavior order: {reason}")]
    InvalidOrder { reason: String },

    /// The configuration document could not be parsed
    #[error("Invalid node type configuration: {reason}")]
    Parse { reason: String },
}

impl ConfigError {
    /// Check if this error comes from behavior composition
    pub fn is_composition_error(&self) -> bool {
        matches!(
            self,
            ConfigError::DuplicateBehavior { .. } | ConfigError::InvalidOrder { .. }
        )
    }
}

// Conversion from ConfigError to the main Error type
impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

fn default_strict() -> bool {
    true
}

/// One behavior entry of a node type configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorConfig {
    Adopt,
    ChildValidate,
    Order,
    Reference,
    Attributed {
        /// Attribute whitelist, external key -> internal key
        #[serde(default)]
        aliases: Option<IndexMap<String, String>>,
        #[serde(default = "default_strict")]
        strict: bool,
    },
    Lifecycle {
        /// Class identifier overrides per transition
        #[serde(default)]
        events: HashMap<Transition, String>,
    },
}

/// Serializable description of a node type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeTypeConfig {
    pub name: String,
    /// Behaviors, outermost first
    #[serde(default)]
    pub behaviors: Vec<BehaviorConfig>,
    #[serde(default)]
    pub allow_non_node_children: bool,
    #[serde(default)]
    pub root: bool,
}

impl NodeTypeConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| {
            ConfigError::Parse {
                reason: err.to_string(),
            }
            .into()
        })
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the configured node type.
    ///
    /// `sink` receives the notifications of a configured lifecycle behavior; without
    /// one they are logged through [`TracingSink`].
    pub fn build(&self, sink: Option<Rc<dyn EventSink>>) -> Result<NodeType> {
        let mut builder = NodeType::builder(&self.name)
            .allow_non_node_children(self.allow_non_node_children)
            .root(self.root);

        for behavior in &self.behaviors {
            builder = match behavior {
                BehaviorConfig::Adopt => builder.behavior(Adopt),
                BehaviorConfig::ChildValidate => builder.behavior(ChildValidate::default()),
                BehaviorConfig::Order => builder.behavior(Order),
                BehaviorConfig::Reference => builder.behavior(Reference),
                BehaviorConfig::Attributed { aliases, strict } => match aliases {
                    Some(aliases) => builder.behavior(Attributed::with_aliases(
                        DictAliaser::new(aliases.clone()).with_strict(*strict),
                    )),
                    None => builder.behavior(Attributed::new()),
                },
                BehaviorConfig::Lifecycle { events } => {
                    let sink = sink
                        .clone()
                        .unwrap_or_else(|| Rc::new(TracingSink) as Rc<dyn EventSink>);
                    let events = events
                        .iter()
                        .fold(LifecycleEvents::default(), |events, (transition, class)| {
                            events.with(*transition, class.clone())
                        });
                    builder.behavior(Lifecycle::new(sink).with_events(events))
                }
            };
        }

        builder.build()
    }
}
