//! Structural arbitraries.
//!
//! Builders compose proptest strategies: tuples of strategies for structs
//! and tuples, `collection::vec` for arrays, `collection::btree_map` for
//! index signatures, and `strategy::Union` for unions.
//!
//! Refinements narrow the context bounds before the inner builder runs, so
//! leaves and collections draw inside the permitted range directly. A
//! `prop_filter` with the constraint predicate remains as a backstop for
//! builders that ignore bounds.
//!
//! Recursion is cut by depth: composites descend one level per child, and
//! at the configured limit collections take their minimum size and unions
//! take their base member: the first one that reaches a finite value
//! without re-entering a recursive reference still being resolved.

use std::collections::HashSet;
use std::sync::Weak;

use proptest::collection;
use proptest::strategy::{BoxedStrategy, Just, Strategy, Union};
use schemata_core::capability::ArbitraryFn;
use schemata_core::{
    Arbitrary, CapabilityKind, Constraint, GenContext, Identity, ResolveError, SchemaKind,
    SchemaNode, Value,
};
use serde_json::Map;

use crate::resolver::{plumbing, Interpretation, Resolver, Slot};

/// Key pattern used when the configured one is not a valid regex.
const FALLBACK_KEY_PATTERN: &str = "[a-z]{0,8}";

impl Interpretation for Arbitrary {
    plumbing!(Arbitrary, ArbitraryFn);

    fn forward(slot: Slot<ArbitraryFn>) -> Self {
        Arbitrary::new(move |ctx| {
            let hard_limit = ctx.config().max_depth.saturating_mul(2) + 8;
            if ctx.depth() > hard_limit {
                return exhausted("recursive schema has no finite sample within depth limit");
            }
            match slot.get().and_then(Weak::upgrade) {
                Some(target) => target(&ctx.deeper()),
                None => exhausted("recursive schema was dropped"),
            }
        })
    }

    fn structure(fields: Vec<(String, Self)>) -> Self {
        Arbitrary::new(move |ctx| {
            let child = ctx.descend();
            fields
                .iter()
                .fold(Just(Map::new()).boxed(), |acc, (name, arbitrary)| {
                    let name = name.clone();
                    (acc, arbitrary.build(&child))
                        .prop_map(move |(mut map, v)| {
                            map.insert(name.clone(), v);
                            map
                        })
                        .boxed()
                })
                .prop_map(Value::Object)
                .boxed()
        })
    }

    fn tuple(elements: Vec<Self>) -> Self {
        Arbitrary::new(move |ctx| {
            let child = ctx.descend();
            elements
                .iter()
                .fold(Just(Vec::new()).boxed(), |acc, arbitrary| {
                    (acc, arbitrary.build(&child))
                        .prop_map(|(mut items, v)| {
                            items.push(v);
                            items
                        })
                        .boxed()
                })
                .prop_map(Value::Array)
                .boxed()
        })
    }

    fn array(item: Self) -> Self {
        Arbitrary::new(move |ctx| {
            let (lo, hi) = ctx.length_range();
            collection::vec(item.build(&ctx.descend()), lo..=hi)
                .prop_map(Value::Array)
                .boxed()
        })
    }

    fn union(
        resolver: &mut Resolver<'_>,
        members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError> {
        let base = members
            .iter()
            .position(|member| bottoms_out(resolver, member, false, &mut HashSet::new()))
            .unwrap_or(0);
        tracing::trace!(members = members.len(), base, "union base case");
        Ok(Arbitrary::new(move |ctx| {
            if resolved.is_empty() {
                return exhausted("union has no members");
            }
            if ctx.at_depth_limit() {
                return match resolved.get(base) {
                    Some(member) => member.build(ctx),
                    None => exhausted("union has no members"),
                };
            }
            Union::new(resolved.iter().map(|member| member.build(ctx))).boxed()
        }))
    }

    fn index_signature(value: Self) -> Self {
        Arbitrary::new(move |ctx| {
            let (lo, hi) = ctx.length_range();
            collection::btree_map(key_strategy(ctx), value.build(&ctx.descend()), lo..=hi)
                .prop_map(|entries| Value::Object(entries.into_iter().collect()))
                .boxed()
        })
    }

    fn refined(inner: Self, constraint: Constraint) -> Self {
        Arbitrary::new(move |ctx| {
            inner
                .build(&ctx.narrow(&constraint))
                .prop_filter(constraint.name(), move |v| constraint.check(v).is_ok())
                .boxed()
        })
    }
}

/// Whether `node` generates a finite value once the depth limit is reached,
/// where collections shrink to their minimum size and unions take their
/// base member. `nonempty` is set under a positive `minLength`.
///
/// A reference to a lazy node that is still being resolved never bottoms
/// out: following it re-enters the union being analysed.
fn bottoms_out(
    resolver: &Resolver<'_>,
    node: &SchemaNode,
    nonempty: bool,
    visiting: &mut HashSet<Identity>,
) -> bool {
    match node.kind() {
        SchemaKind::Declared(_) => true,
        SchemaKind::Struct(fields) => fields
            .iter()
            .all(|field| bottoms_out(resolver, &field.schema, false, visiting)),
        SchemaKind::Tuple(elements) => elements
            .iter()
            .all(|element| bottoms_out(resolver, element, false, visiting)),
        SchemaKind::Array(item) | SchemaKind::IndexSignature(item) => {
            !nonempty || bottoms_out(resolver, item, false, visiting)
        }
        SchemaKind::Union(members) => members
            .iter()
            .any(|member| bottoms_out(resolver, member, false, visiting)),
        SchemaKind::Refined(refinement) => {
            let nonempty = nonempty || matches!(refinement.constraint, Constraint::MinLength(n) if n > 0);
            bottoms_out(resolver, &refinement.inner, nonempty, visiting)
        }
        SchemaKind::Lazy(cell) => {
            let identity = cell.identity();
            if resolver.is_resolving(identity, CapabilityKind::Arbitrary)
                || !visiting.insert(identity.clone())
            {
                return false;
            }
            let finite = bottoms_out(resolver, cell.realize(), nonempty, visiting);
            visiting.remove(identity);
            finite
        }
    }
}

fn key_strategy(ctx: &GenContext) -> BoxedStrategy<String> {
    let pattern = &ctx.config().key_pattern;
    match proptest::string::string_regex(pattern) {
        Ok(strategy) => strategy.boxed(),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "invalid key pattern, using default");
            proptest::string::string_regex(FALLBACK_KEY_PATTERN)
                .map(Strategy::boxed)
                .unwrap_or_else(|_| Just(String::new()).boxed())
        }
    }
}

/// A strategy that rejects every candidate with `reason`.
fn exhausted(reason: &'static str) -> BoxedStrategy<Value> {
    Just(Value::Null).prop_filter(reason, |_| false).boxed()
}
