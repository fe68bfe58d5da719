//! # Schema AST
//!
//! A schema is an immutable description of a value's shape. [`SchemaNode`]
//! is the untyped, shared AST; [`Schema<A>`] is the same node tagged with
//! the type `A` it describes. Construction is total and side-effect free:
//! no provider is consulted and no lazy producer runs until a capability is
//! resolved.
//!
//! ## Node Tags
//!
//! | Tag | Children |
//! |-----|----------|
//! | declared | identity, attached provider, type parameters |
//! | struct | ordered `name -> schema` fields |
//! | tuple | ordered element schemas |
//! | array | element schema |
//! | union | ordered members, at least two |
//! | indexSignature | value schema for arbitrary string keys |
//! | lazy | identity + producer, realized at most once |
//! | refined | inner schema + [`Constraint`] |
//!
//! ## Recursive Schemas
//!
//! A self-referential schema is written as a function returning a lazy
//! node. Every call builds a fresh node, so the lazy identity (not the node
//! address) is what the resolver uses to detect recursion:
//!
//! ```
//! use schemata_core::schema::{array, lazy, struct_, Schema};
//! use schemata_core::Identity;
//! # use schemata_core::{Factory, Guard, Provider};
//! # fn string() -> Schema<String> {
//! #     let id = Identity::new("doc/string");
//! #     schemata_core::schema::declare(id.clone(), Provider::make(id, [Factory::guard(|_| Guard::new(|v| v.is_string()))]))
//! # }
//! struct Category;
//!
//! fn category() -> Schema<Category> {
//!     lazy(Identity::new("doc/Category"), || {
//!         struct_([
//!             ("name", string().node()),
//!             ("children", array(category()).node()),
//!         ])
//!     })
//! }
//! # let _ = category();
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::identity::Identity;
use crate::provider::Provider;
use crate::refinement::Constraint;

/// A declaration leaf: interpreted entirely by providers.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub identity: Identity,
    /// Fallback provider consulted after the caller's registry.
    pub provider: Provider,
    /// Schemas whose capabilities are passed to the factories, in order.
    pub type_parameters: Vec<SchemaNode>,
}

/// A struct field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub schema: SchemaNode,
}

/// A deferred schema, realized at most once.
#[derive(Clone)]
pub struct LazySchema {
    identity: Identity,
    producer: Arc<dyn Fn() -> SchemaNode + Send + Sync>,
    realized: Arc<OnceLock<SchemaNode>>,
}

impl LazySchema {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Run the producer on first call; return the cached node afterwards.
    pub fn realize(&self) -> &SchemaNode {
        self.realized.get_or_init(|| {
            tracing::debug!(identity = %self.identity, "realizing lazy schema");
            (self.producer)()
        })
    }

    /// Whether the producer has run.
    pub fn is_realized(&self) -> bool {
        self.realized.get().is_some()
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("identity", &self.identity)
            .field("realized", &self.is_realized())
            .finish()
    }
}

/// A refinement wrapper: `inner` restricted by `constraint`.
#[derive(Debug, Clone)]
pub struct Refinement {
    pub inner: SchemaNode,
    pub constraint: Constraint,
}

/// The node variants of the schema AST.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Declared(Declaration),
    Struct(Vec<Field>),
    Tuple(Vec<SchemaNode>),
    Array(SchemaNode),
    Union(Vec<SchemaNode>),
    IndexSignature(SchemaNode),
    Lazy(LazySchema),
    Refined(Refinement),
}

/// Shared, immutable schema AST node.
#[derive(Clone)]
pub struct SchemaNode(Arc<SchemaKind>);

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.0
    }

    /// Short tag name of this node.
    pub fn tag(&self) -> &'static str {
        match self.kind() {
            SchemaKind::Declared(_) => "declared",
            SchemaKind::Struct(_) => "struct",
            SchemaKind::Tuple(_) => "tuple",
            SchemaKind::Array(_) => "array",
            SchemaKind::Union(_) => "union",
            SchemaKind::IndexSignature(_) => "indexSignature",
            SchemaKind::Lazy(_) => "lazy",
            SchemaKind::Refined(_) => "refined",
        }
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            SchemaKind::Declared(d) => write!(f, "declared({})", d.identity),
            SchemaKind::Lazy(l) => write!(f, "lazy({})", l.identity),
            kind => fmt::Debug::fmt(kind, f),
        }
    }
}

/// A schema node describing values of type `A`.
pub struct Schema<A> {
    node: SchemaNode,
    _marker: PhantomData<fn() -> A>,
}

impl<A> Schema<A> {
    /// Tag an untyped node with `A`. The caller vouches for the type.
    pub fn from_node(node: SchemaNode) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// The untyped node, cloned.
    pub fn node(&self) -> SchemaNode {
        self.node.clone()
    }

    pub fn as_node(&self) -> &SchemaNode {
        &self.node
    }

    fn refine(self, constraint: Constraint) -> Self {
        Self::from_node(SchemaNode::new(SchemaKind::Refined(Refinement {
            inner: self.node,
            constraint,
        })))
    }

    /// Require length (chars or elements) `>= n`.
    pub fn min_length(self, n: usize) -> Self {
        self.refine(Constraint::MinLength(n))
    }

    /// Require length (chars or elements) `<= n`.
    pub fn max_length(self, n: usize) -> Self {
        self.refine(Constraint::MaxLength(n))
    }

    /// Require a numeric value `>= n`.
    pub fn minimum(self, n: f64) -> Self {
        self.refine(Constraint::Minimum(n))
    }

    /// Require a numeric value `<= n`.
    pub fn maximum(self, n: f64) -> Self {
        self.refine(Constraint::Maximum(n))
    }
}

impl<A> Clone for Schema<A> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<A> fmt::Debug for Schema<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.node, f)
    }
}

impl<A> From<Schema<A>> for SchemaNode {
    fn from(schema: Schema<A>) -> Self {
        schema.node
    }
}

/// A declaration interpreted by `provider` (or the caller's registry).
pub fn declare<A>(identity: Identity, provider: Provider) -> Schema<A> {
    declare_with(identity, provider, Vec::new())
}

/// A declaration whose factories receive `type_parameters`' capabilities.
pub fn declare_with<A>(
    identity: Identity,
    provider: Provider,
    type_parameters: Vec<SchemaNode>,
) -> Schema<A> {
    Schema::from_node(SchemaNode::new(SchemaKind::Declared(Declaration {
        identity,
        provider,
        type_parameters,
    })))
}

/// A record with the given fields, in order.
pub fn struct_<A, K: Into<String>>(fields: impl IntoIterator<Item = (K, SchemaNode)>) -> Schema<A> {
    let fields = fields
        .into_iter()
        .map(|(name, schema)| Field {
            name: name.into(),
            schema,
        })
        .collect();
    Schema::from_node(SchemaNode::new(SchemaKind::Struct(fields)))
}

/// A fixed-arity positional sequence.
pub fn tuple<A>(elements: impl IntoIterator<Item = SchemaNode>) -> Schema<A> {
    Schema::from_node(SchemaNode::new(SchemaKind::Tuple(
        elements.into_iter().collect(),
    )))
}

/// A homogeneous sequence.
pub fn array<A>(item: Schema<A>) -> Schema<Vec<A>> {
    Schema::from_node(SchemaNode::new(SchemaKind::Array(item.node)))
}

/// One of two or more members, tried in declaration order.
pub fn union<A>(
    first: impl Into<SchemaNode>,
    second: impl Into<SchemaNode>,
    rest: impl IntoIterator<Item = SchemaNode>,
) -> Schema<A> {
    let mut members = vec![first.into(), second.into()];
    members.extend(rest);
    Schema::from_node(SchemaNode::new(SchemaKind::Union(members)))
}

/// A dictionary from arbitrary string keys to `value`.
pub fn index_signature<A>(
    value: Schema<A>,
) -> Schema<std::collections::BTreeMap<String, A>> {
    Schema::from_node(SchemaNode::new(SchemaKind::IndexSignature(value.node)))
}

/// A deferred schema named `identity`. `producer` runs at most once per
/// node, on first resolution.
pub fn lazy<A>(
    identity: Identity,
    producer: impl Fn() -> Schema<A> + Send + Sync + 'static,
) -> Schema<A> {
    Schema::from_node(SchemaNode::new(SchemaKind::Lazy(LazySchema {
        identity,
        producer: Arc::new(move || producer().node),
        realized: Arc::new(OnceLock::new()),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn leaf(name: &str) -> SchemaNode {
        let id = Identity::new(name);
        declare::<()>(id.clone(), Provider::make(id, [])).node()
    }

    #[test]
    fn struct_preserves_field_order() {
        let s: Schema<()> = struct_([("z", leaf("t/a")), ("a", leaf("t/b")), ("m", leaf("t/c"))]);
        let SchemaKind::Struct(fields) = s.as_node().kind() else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn union_has_at_least_two_members() {
        let u: Schema<()> = union(leaf("t/a"), leaf("t/b"), []);
        let SchemaKind::Union(members) = u.as_node().kind() else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn refinements_nest_outermost_last() {
        let s: Schema<()> = Schema::from_node(leaf("t/s")).min_length(1).max_length(2);
        let SchemaKind::Refined(outer) = s.as_node().kind() else {
            panic!("expected refinement");
        };
        assert_eq!(outer.constraint, Constraint::MaxLength(2));
        let SchemaKind::Refined(inner) = outer.inner.kind() else {
            panic!("expected nested refinement");
        };
        assert_eq!(inner.constraint, Constraint::MinLength(1));
        assert_eq!(inner.inner.tag(), "declared");
    }

    #[test]
    fn lazy_producer_runs_once_and_not_at_construction() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let s: Schema<()> = lazy(Identity::new("t/lazy"), || {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Schema::from_node(leaf("t/inner"))
        });
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        let SchemaKind::Lazy(cell) = s.as_node().kind() else {
            panic!("expected lazy");
        };
        assert!(!cell.is_realized());
        assert_eq!(cell.realize().tag(), "declared");
        assert_eq!(cell.realize().tag(), "declared");
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(cell.is_realized());
    }
}
