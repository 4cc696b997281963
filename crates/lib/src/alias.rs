//! Key aliasing for nodes and attribute stores.
//!
//! An alias maps an externally visible key to the internal key a value is stored
//! under. Aliases are either a static [`DictAliaser`] or a resolver function that
//! computes the aliaser from the owning node at the time of access.
//!
//! ```
//! # use nodal::alias::DictAliaser;
//! let aliaser = DictAliaser::new([("title", "dc:title")]);
//! assert_eq!(aliaser.unalias("title").as_deref(), Some("dc:title"));
//! assert_eq!(aliaser.alias("dc:title").as_deref(), Some("title"));
//!
//! // Strict aliasers act as a whitelist
//! assert_eq!(aliaser.unalias("creator"), None);
//! ```

use std::{collections::HashMap, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::node::Node;

/// A static mapping between external keys and internal keys.
///
/// A strict aliaser (the default) resolves only the keys it knows about, which makes it a
/// whitelist. A non-strict aliaser passes unknown keys through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictAliaser {
    /// external key -> internal key
    forward: IndexMap<String, String>,
    /// internal key -> external key
    inverse: HashMap<String, String>,
    strict: bool,
}

impl DictAliaser {
    /// Creates a strict aliaser from `(external, internal)` pairs.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let forward: IndexMap<String, String> = pairs
            .into_iter()
            .map(|(external, internal)| (external.into(), internal.into()))
            .collect();
        let inverse = forward
            .iter()
            .map(|(external, internal)| (internal.clone(), external.clone()))
            .collect();
        Self {
            forward,
            inverse,
            strict: true,
        }
    }

    /// Sets whether unknown keys are rejected (strict) or passed through.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the external key for an internal key.
    pub fn alias(&self, internal: &str) -> Option<String> {
        match self.inverse.get(internal) {
            Some(external) => Some(external.clone()),
            None if self.strict => None,
            None => Some(internal.to_string()),
        }
    }

    /// Returns the internal key for an external key.
    pub fn unalias(&self, external: &str) -> Option<String> {
        match self.forward.get(external) {
            Some(internal) => Some(internal.clone()),
            None if self.strict => None,
            None => Some(external.to_string()),
        }
    }

    /// External keys in declaration order.
    pub fn external_keys(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }
}

/// Resolver computing an aliaser from the owning node.
pub type AliasResolver = dyn Fn(&Node) -> DictAliaser;

/// Alias configuration of a node or attribute store.
#[derive(Clone)]
pub enum Aliases {
    /// A fixed mapping shared by every access
    Static(Rc<DictAliaser>),
    /// A mapping computed from the owning node on each access
    Resolver(Rc<AliasResolver>),
}

impl Aliases {
    /// Creates static strict aliases from `(external, internal)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Aliases::Static(Rc::new(DictAliaser::new(pairs)))
    }

    /// Creates aliases resolved from the owning node on every access.
    pub fn resolver(f: impl Fn(&Node) -> DictAliaser + 'static) -> Self {
        Aliases::Resolver(Rc::new(f))
    }

    /// Resolves the aliaser to use for an access on `owner`.
    pub fn resolve(&self, owner: &Node) -> Rc<DictAliaser> {
        match self {
            Aliases::Static(aliaser) => Rc::clone(aliaser),
            Aliases::Resolver(f) => Rc::new(f(owner)),
        }
    }
}

impl From<DictAliaser> for Aliases {
    fn from(aliaser: DictAliaser) -> Self {
        Aliases::Static(Rc::new(aliaser))
    }
}

impl fmt::Debug for Aliases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aliases::Static(aliaser) => f.debug_tuple("Static").field(aliaser).finish(),
            Aliases::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}
