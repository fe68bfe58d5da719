//! # Providers and Registry
//!
//! A [`Provider`] attaches capability factories to one declaration
//! identity. A [`Registry`] is the merged, read-only lookup from
//! `(identity, kind)` to factory that resolution consults.
//!
//! Factories rather than instances are stored so that mutually recursive
//! providers can be assembled without eager evaluation. A factory receives
//! the resolved capabilities of the declaration's type parameters, in
//! declaration order, and builds the declaration's capability from them.
//!
//! ## Merge Policy
//!
//! Merging is order-stable. Providers for disjoint identities combine in
//! any order with the same result. For a duplicate `(identity, kind)` the
//! first registration is kept and later ones are ignored; callers that need
//! to override an interpretation must place their provider first.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::capability::{Arbitrary, CapabilityKind, Decoder, Encoder, Guard, Show};
use crate::identity::Identity;

/// Builds one capability kind for a declaration from its type parameters.
#[derive(Clone)]
pub enum Factory {
    Guard(Arc<dyn Fn(&[Guard]) -> Guard + Send + Sync>),
    Decoder(Arc<dyn Fn(&[Decoder]) -> Decoder + Send + Sync>),
    Encoder(Arc<dyn Fn(&[Encoder]) -> Encoder + Send + Sync>),
    Arbitrary(Arc<dyn Fn(&[Arbitrary]) -> Arbitrary + Send + Sync>),
    Show(Arc<dyn Fn(&[Show]) -> Show + Send + Sync>),
}

impl Factory {
    pub fn guard(f: impl Fn(&[Guard]) -> Guard + Send + Sync + 'static) -> Self {
        Self::Guard(Arc::new(f))
    }

    pub fn decoder(f: impl Fn(&[Decoder]) -> Decoder + Send + Sync + 'static) -> Self {
        Self::Decoder(Arc::new(f))
    }

    pub fn encoder(f: impl Fn(&[Encoder]) -> Encoder + Send + Sync + 'static) -> Self {
        Self::Encoder(Arc::new(f))
    }

    pub fn arbitrary(f: impl Fn(&[Arbitrary]) -> Arbitrary + Send + Sync + 'static) -> Self {
        Self::Arbitrary(Arc::new(f))
    }

    pub fn show(f: impl Fn(&[Show]) -> Show + Send + Sync + 'static) -> Self {
        Self::Show(Arc::new(f))
    }

    /// The capability kind this factory produces.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Guard(_) => CapabilityKind::Guard,
            Self::Decoder(_) => CapabilityKind::Decoder,
            Self::Encoder(_) => CapabilityKind::Encoder,
            Self::Arbitrary(_) => CapabilityKind::Arbitrary,
            Self::Show(_) => CapabilityKind::Show,
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Factory({})", self.kind())
    }
}

/// Capability factories attached to one declaration identity.
///
/// # Invariants
///
/// - At most one factory per capability kind. [`Provider::make`] keeps the
///   first factory it sees for each kind.
/// - Missing kinds are legal; resolving one fails at resolution time.
#[derive(Debug, Clone)]
pub struct Provider {
    identity: Identity,
    factories: BTreeMap<CapabilityKind, Factory>,
}

impl Provider {
    /// Bundle `factories` under `identity`.
    pub fn make(identity: Identity, factories: impl IntoIterator<Item = Factory>) -> Self {
        let mut map = BTreeMap::new();
        for factory in factories {
            map.entry(factory.kind()).or_insert(factory);
        }
        Self {
            identity,
            factories: map,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The factory for `kind`, if this provider supplies one.
    pub fn get(&self, kind: CapabilityKind) -> Option<&Factory> {
        self.factories.get(&kind)
    }

    /// Kinds this provider supplies, in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = CapabilityKind> + '_ {
        self.factories.keys().copied()
    }
}

/// Merged, read-only lookup from `(identity, kind)` to factory.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<(Identity, CapabilityKind), Factory>,
}

impl Registry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge `providers` in order. The first registration of each
    /// `(identity, kind)` wins.
    pub fn merge<'a>(providers: impl IntoIterator<Item = &'a Provider>) -> Self {
        providers
            .into_iter()
            .fold(Self::empty(), |registry, provider| registry.with(provider))
    }

    /// Add `provider` after every existing registration.
    pub fn with(mut self, provider: &Provider) -> Self {
        for (kind, factory) in &provider.factories {
            let key = (provider.identity.clone(), *kind);
            if self.entries.contains_key(&key) {
                tracing::debug!(
                    identity = %provider.identity,
                    kind = %kind,
                    "duplicate registration ignored, first provider wins"
                );
                continue;
            }
            self.entries.insert(key, factory.clone());
        }
        self
    }

    /// Concatenate two registries; `self`'s entries win on conflict.
    pub fn combine(mut self, other: &Registry) -> Self {
        for (key, factory) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| factory.clone());
        }
        self
    }

    /// The factory for `(identity, kind)`, if registered.
    pub fn lookup(&self, identity: &Identity, kind: CapabilityKind) -> Option<&Factory> {
        self.entries.get(&(identity.clone(), kind))
    }

    /// Whether `(identity, kind)` is registered.
    pub fn contains(&self, identity: &Identity, kind: CapabilityKind) -> bool {
        self.lookup(identity, kind).is_some()
    }

    /// Number of `(identity, kind)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&Provider> for Registry {
    fn from(provider: &Provider) -> Self {
        Self::empty().with(provider)
    }
}
