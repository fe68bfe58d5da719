//! Structural guards.
//!
//! Struct guards accept a superset of the declared fields: extra keys are
//! ignored, every declared key must be present and accepted.

use std::sync::Weak;

use schemata_core::capability::GuardFn;
use schemata_core::{Constraint, Guard, ResolveError, SchemaNode, Value};

use crate::resolver::{plumbing, Interpretation, Resolver, Slot};

impl Interpretation for Guard {
    plumbing!(Guard, GuardFn);

    fn forward(slot: Slot<GuardFn>) -> Self {
        Guard::new(move |input| match slot.get().and_then(Weak::upgrade) {
            Some(target) => target(input),
            None => false,
        })
    }

    fn structure(fields: Vec<(String, Self)>) -> Self {
        Guard::new(move |input| match input {
            Value::Object(map) => fields
                .iter()
                .all(|(name, guard)| map.get(name).is_some_and(|v| guard.is(v))),
            _ => false,
        })
    }

    fn tuple(elements: Vec<Self>) -> Self {
        Guard::new(move |input| match input {
            Value::Array(items) => {
                items.len() == elements.len()
                    && items.iter().zip(&elements).all(|(v, guard)| guard.is(v))
            }
            _ => false,
        })
    }

    fn array(item: Self) -> Self {
        Guard::new(move |input| match input {
            Value::Array(items) => items.iter().all(|v| item.is(v)),
            _ => false,
        })
    }

    fn union(
        _resolver: &mut Resolver<'_>,
        _members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError> {
        Ok(Guard::new(move |input| resolved.iter().any(|g| g.is(input))))
    }

    fn index_signature(value: Self) -> Self {
        Guard::new(move |input| match input {
            Value::Object(map) => map.values().all(|v| value.is(v)),
            _ => false,
        })
    }

    fn refined(inner: Self, constraint: Constraint) -> Self {
        Guard::new(move |input| inner.is(input) && constraint.check(input).is_ok())
    }
}
