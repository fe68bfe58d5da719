//! Structural encoders.
//!
//! Encoders are total. Input that does not match the expected shape is
//! passed through unchanged rather than rejected; encoding assumes the
//! value already satisfies the schema's guard. Undeclared struct keys are
//! kept as they are.
//!
//! A union encoder selects a member by guard. When several member guards
//! accept the value, the first in declaration order is used and a warning
//! is logged: overlapping members are a modelling hazard, not something the
//! encoder can disambiguate.

use std::sync::Weak;

use schemata_core::capability::EncodeFn;
use schemata_core::{Constraint, Encoder, Guard, ResolveError, SchemaNode, Value};

use crate::decoder::undeclared;
use crate::resolver::{plumbing, Interpretation, Resolver, Slot};

impl Interpretation for Encoder {
    plumbing!(Encoder, EncodeFn);

    fn forward(slot: Slot<EncodeFn>) -> Self {
        Encoder::new(move |value| match slot.get().and_then(Weak::upgrade) {
            Some(target) => target(value),
            None => value.clone(),
        })
    }

    fn structure(fields: Vec<(String, Self)>) -> Self {
        Encoder::new(move |value| match value {
            Value::Object(map) => {
                let mut out = undeclared(map, &fields);
                for (name, encoder) in &fields {
                    if let Some(v) = map.get(name) {
                        out.insert(name.clone(), encoder.encode(v));
                    }
                }
                Value::Object(out)
            }
            other => other.clone(),
        })
    }

    fn tuple(elements: Vec<Self>) -> Self {
        Encoder::new(move |value| match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| elements.get(i).map_or_else(|| v.clone(), |e| e.encode(v)))
                    .collect(),
            ),
            other => other.clone(),
        })
    }

    fn array(item: Self) -> Self {
        Encoder::new(move |value| match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| item.encode(v)).collect()),
            other => other.clone(),
        })
    }

    fn union(
        resolver: &mut Resolver<'_>,
        members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError> {
        let guards = member_guards(resolver, members)?;
        Ok(Encoder::new(move |value| {
            let mut matching = guards
                .iter()
                .enumerate()
                .filter(|(_, guard)| guard.is(value))
                .map(|(i, _)| i);
            match matching.next() {
                Some(first) => {
                    if let Some(second) = matching.next() {
                        tracing::warn!(
                            first,
                            second,
                            "ambiguous union value, encoding with first matching member"
                        );
                    }
                    resolved[first].encode(value)
                }
                None => {
                    tracing::warn!("value matches no union member, passing through");
                    value.clone()
                }
            }
        }))
    }

    fn index_signature(value: Self) -> Self {
        Encoder::new(move |input| match input {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), value.encode(v)))
                    .collect(),
            ),
            other => other.clone(),
        })
    }

    fn refined(inner: Self, _constraint: Constraint) -> Self {
        inner
    }
}

/// Resolve the guard of every union member, for member selection.
pub(crate) fn member_guards(
    resolver: &mut Resolver<'_>,
    members: &[SchemaNode],
) -> Result<Vec<Guard>, ResolveError> {
    members
        .iter()
        .enumerate()
        .map(|(i, member)| resolver.resolve_child(format!("<{i}>"), member))
        .collect()
}
