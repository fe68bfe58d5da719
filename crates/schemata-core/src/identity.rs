//! # Stable Identities
//!
//! Declared and lazy schema nodes are keyed by an [`Identity`]: an opaque,
//! interned-by-value token. Two identities are equal iff their names are
//! equal, so a well-known name such as `"schemata/data/string"` refers to
//! the same declaration wherever it is constructed.
//!
//! ## Invariant
//!
//! An identity names exactly one schema. Registering two different
//! interpretations under one identity, or reusing a lazy identity for two
//! different recursive shapes, is a configuration defect that the registry
//! and resolver cannot detect.

use std::fmt;
use std::sync::Arc;

/// Opaque, globally unique token naming a declaration or lazy schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Create an identity from its canonical name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The canonical name of this identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}
