//! # Capability Resolver
//!
//! One traversal serves every capability kind. [`Resolver::resolve`] walks
//! a [`SchemaNode`]:
//!
//! - **declared**: look up `(identity, kind)` in the caller's registry, then
//!   in the node's attached provider. A miss aborts resolution with
//!   [`ResolveError::MissingCapability`]. Parameterless declarations are
//!   memoised by identity for the rest of the pass.
//! - **composite**: resolve children for the same kind, then hand them to
//!   the kind's [`Interpretation`] combinator.
//! - **lazy**: realize the node once and resolve it. While that is in
//!   progress, a second visit of the same lazy identity gets a forwarding
//!   placeholder instead of re-entering the producer.
//! - **refined**: resolve the inner node, then wrap it with the constraint.
//!
//! ## Recursion Guard
//!
//! The placeholder holds a [`Slot`]: a once-cell that receives a `Weak`
//! reference to the real capability when the lazy node finishes resolving.
//! Placeholders only occur below the first visit of their lazy node, and
//! that first visit's capability is owned by its ancestors, so the weak
//! reference stays live for as long as anything can reach the placeholder
//! and no reference cycle is created.
//!
//! ## Memoisation Scope
//!
//! The memo lives for one [`Resolver`], i.e. one resolution pass. It is
//! never shared across unrelated calls.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use schemata_core::capability::{ArbitraryFn, DecodeFn, EncodeFn, GuardFn, ShowFn};
use schemata_core::schema::{Declaration, LazySchema};
use schemata_core::{
    Capability, CapabilityKind, Constraint, Factory, Identity, Registry, ResolveError, SchemaKind,
    SchemaNode,
};

/// Once-cell a forwarding placeholder reads its target from.
pub type Slot<F> = Arc<OnceLock<Weak<F>>>;

/// A lazy node whose resolution is in progress, by kind.
#[derive(Clone)]
pub enum Pending {
    Guard(Slot<GuardFn>),
    Decoder(Slot<DecodeFn>),
    Encoder(Slot<EncodeFn>),
    Arbitrary(Slot<ArbitraryFn>),
    Show(Slot<ShowFn>),
}

mod private {
    pub trait Sealed {}
    impl Sealed for schemata_core::Guard {}
    impl Sealed for schemata_core::Decoder {}
    impl Sealed for schemata_core::Encoder {}
    impl Sealed for schemata_core::Arbitrary {}
    impl Sealed for schemata_core::Show {}
}

/// How one capability kind combines resolved children.
///
/// Sealed: only the five capability kinds implement it.
pub trait Interpretation: private::Sealed + Clone + Send + Sync + 'static {
    /// The shared function type inside the capability.
    type Func: ?Sized + Send + Sync + 'static;
    /// The kind this interpretation resolves.
    const KIND: CapabilityKind;

    fn wrap(self) -> Capability;
    fn unwrap(capability: &Capability) -> Option<Self>;
    fn from_factory(factory: &Factory, params: &[Self]) -> Option<Self>;
    fn as_func(&self) -> &Arc<Self::Func>;
    fn pending(slot: Slot<Self::Func>) -> Pending;
    fn unpending(pending: &Pending) -> Option<Slot<Self::Func>>;

    /// Placeholder that forwards to the capability stored in `slot`.
    fn forward(slot: Slot<Self::Func>) -> Self;
    fn structure(fields: Vec<(String, Self)>) -> Self;
    fn tuple(elements: Vec<Self>) -> Self;
    fn array(item: Self) -> Self;
    fn union(
        resolver: &mut Resolver<'_>,
        members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError>;
    fn index_signature(value: Self) -> Self;
    fn refined(inner: Self, constraint: Constraint) -> Self;
}

/// Implements the kind-dispatch half of [`Interpretation`] for one variant.
macro_rules! plumbing {
    ($variant:ident, $func:ty) => {
        type Func = $func;
        const KIND: ::schemata_core::CapabilityKind = ::schemata_core::CapabilityKind::$variant;

        fn wrap(self) -> ::schemata_core::Capability {
            ::schemata_core::Capability::$variant(self)
        }

        fn unwrap(capability: &::schemata_core::Capability) -> Option<Self> {
            match capability {
                ::schemata_core::Capability::$variant(c) => Some(c.clone()),
                _ => None,
            }
        }

        fn from_factory(factory: &::schemata_core::Factory, params: &[Self]) -> Option<Self> {
            match factory {
                ::schemata_core::Factory::$variant(make) => Some(make(params)),
                _ => None,
            }
        }

        fn as_func(&self) -> &::std::sync::Arc<Self::Func> {
            self.as_arc()
        }

        fn pending(slot: $crate::resolver::Slot<Self::Func>) -> $crate::resolver::Pending {
            $crate::resolver::Pending::$variant(slot)
        }

        fn unpending(
            pending: &$crate::resolver::Pending,
        ) -> Option<$crate::resolver::Slot<Self::Func>> {
            match pending {
                $crate::resolver::Pending::$variant(slot) => Some(::std::sync::Arc::clone(slot)),
                _ => None,
            }
        }
    };
}
pub(crate) use plumbing;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MemoKey {
    Declared(Identity),
    Lazy(Identity),
}

enum MemoEntry {
    Pending(Pending),
    Done(Capability),
}

/// One resolution pass over a registry.
pub struct Resolver<'r> {
    registry: &'r Registry,
    memo: HashMap<(MemoKey, CapabilityKind), MemoEntry>,
    path: Vec<String>,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            memo: HashMap::new(),
            path: Vec::new(),
        }
    }

    /// Resolve `node` for capability kind `C`.
    pub fn resolve<C: Interpretation>(&mut self, node: &SchemaNode) -> Result<C, ResolveError> {
        match node.kind() {
            SchemaKind::Declared(declaration) => self.declared(declaration),
            SchemaKind::Struct(fields) => {
                let mut resolved = Vec::with_capacity(fields.len());
                for field in fields {
                    let c = self.resolve_child(format!(".{}", field.name), &field.schema)?;
                    resolved.push((field.name.clone(), c));
                }
                Ok(C::structure(resolved))
            }
            SchemaKind::Tuple(elements) => {
                let resolved = elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| self.resolve_child(format!("[{i}]"), element))
                    .collect::<Result<Vec<C>, _>>()?;
                Ok(C::tuple(resolved))
            }
            SchemaKind::Array(item) => Ok(C::array(self.resolve_child("[*]".to_string(), item)?)),
            SchemaKind::Union(members) => {
                let resolved = members
                    .iter()
                    .enumerate()
                    .map(|(i, member)| self.resolve_child(format!("<{i}>"), member))
                    .collect::<Result<Vec<C>, _>>()?;
                C::union(self, members, resolved)
            }
            SchemaKind::IndexSignature(value) => Ok(C::index_signature(
                self.resolve_child("{*}".to_string(), value)?,
            )),
            SchemaKind::Lazy(cell) => self.lazy(cell),
            SchemaKind::Refined(refinement) => {
                let inner = self.resolve(&refinement.inner)?;
                Ok(C::refined(inner, refinement.constraint))
            }
        }
    }

    /// Resolve a child node with `segment` appended to the diagnostic path.
    pub fn resolve_child<C: Interpretation>(
        &mut self,
        segment: String,
        node: &SchemaNode,
    ) -> Result<C, ResolveError> {
        self.path.push(segment);
        let resolved = self.resolve(node);
        self.path.pop();
        resolved
    }

    /// Whether the lazy node `identity` is still being resolved for `kind`
    /// in this pass, i.e. a reference to it would be forwarded.
    pub fn is_resolving(&self, identity: &Identity, kind: CapabilityKind) -> bool {
        matches!(
            self.memo.get(&(MemoKey::Lazy(identity.clone()), kind)),
            Some(MemoEntry::Pending(_))
        )
    }

    fn path_string(&self) -> String {
        format!("${}", self.path.concat())
    }

    fn declared<C: Interpretation>(&mut self, declaration: &Declaration) -> Result<C, ResolveError> {
        let memoizable = declaration.type_parameters.is_empty();
        let key = (MemoKey::Declared(declaration.identity.clone()), C::KIND);
        if memoizable {
            if let Some(MemoEntry::Done(capability)) = self.memo.get(&key) {
                if let Some(c) = C::unwrap(capability) {
                    return Ok(c);
                }
            }
        }

        let missing = || ResolveError::MissingCapability {
            identity: declaration.identity.clone(),
            kind: C::KIND,
            path: self.path_string(),
        };
        let factory = self
            .registry
            .lookup(&declaration.identity, C::KIND)
            .or_else(|| declaration.provider.get(C::KIND))
            .cloned()
            .ok_or_else(missing)?;

        let params = declaration
            .type_parameters
            .iter()
            .enumerate()
            .map(|(i, param)| self.resolve_child(format!("::<{i}>"), param))
            .collect::<Result<Vec<C>, _>>()?;
        let c = C::from_factory(&factory, &params).ok_or_else(|| ResolveError::MissingCapability {
            identity: declaration.identity.clone(),
            kind: C::KIND,
            path: self.path_string(),
        })?;
        tracing::trace!(
            identity = %declaration.identity,
            kind = %C::KIND,
            "resolved declaration"
        );

        if memoizable {
            self.memo.insert(key, MemoEntry::Done(c.clone().wrap()));
        }
        Ok(c)
    }

    fn lazy<C: Interpretation>(&mut self, cell: &LazySchema) -> Result<C, ResolveError> {
        let key = (MemoKey::Lazy(cell.identity().clone()), C::KIND);
        match self.memo.get(&key) {
            Some(MemoEntry::Done(capability)) => {
                if let Some(c) = C::unwrap(capability) {
                    return Ok(c);
                }
            }
            Some(MemoEntry::Pending(pending)) => {
                if let Some(slot) = C::unpending(pending) {
                    tracing::debug!(
                        identity = %cell.identity(),
                        kind = %C::KIND,
                        "recursive reference, forwarding"
                    );
                    return Ok(C::forward(slot));
                }
            }
            None => {}
        }

        let slot: Slot<C::Func> = Arc::new(OnceLock::new());
        self.memo
            .insert(key.clone(), MemoEntry::Pending(C::pending(Arc::clone(&slot))));
        let node = cell.realize().clone();
        let resolved = match self.resolve::<C>(&node) {
            Ok(c) => c,
            Err(e) => {
                self.memo.remove(&key);
                return Err(e);
            }
        };
        // The slot is fresh, so this is its only set.
        let _ = slot.set(Arc::downgrade(resolved.as_func()));
        self.memo.insert(key, MemoEntry::Done(resolved.clone().wrap()));
        Ok(resolved)
    }
}
