//! Structural printers.

use std::sync::Weak;

use schemata_core::capability::ShowFn;
use schemata_core::{Constraint, ResolveError, SchemaNode, Show, Value};

use crate::encoder::member_guards;
use crate::resolver::{plumbing, Interpretation, Resolver, Slot};

impl Interpretation for Show {
    plumbing!(Show, ShowFn);

    fn forward(slot: Slot<ShowFn>) -> Self {
        Show::new(move |value| match slot.get().and_then(Weak::upgrade) {
            Some(target) => target(value),
            None => value.to_string(),
        })
    }

    fn structure(fields: Vec<(String, Self)>) -> Self {
        Show::new(move |value| {
            let Value::Object(map) = value else {
                return value.to_string();
            };
            let parts: Vec<String> = fields
                .iter()
                .filter_map(|(name, show)| {
                    map.get(name).map(|v| format!("{name}: {}", show.show(v)))
                })
                .collect();
            braces(&parts)
        })
    }

    fn tuple(elements: Vec<Self>) -> Self {
        Show::new(move |value| {
            let Value::Array(items) = value else {
                return value.to_string();
            };
            let parts: Vec<String> = items
                .iter()
                .zip(&elements)
                .map(|(v, show)| show.show(v))
                .collect();
            format!("[{}]", parts.join(", "))
        })
    }

    fn array(item: Self) -> Self {
        Show::new(move |value| {
            let Value::Array(items) = value else {
                return value.to_string();
            };
            let parts: Vec<String> = items.iter().map(|v| item.show(v)).collect();
            format!("[{}]", parts.join(", "))
        })
    }

    fn union(
        resolver: &mut Resolver<'_>,
        members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError> {
        let guards = member_guards(resolver, members)?;
        Ok(Show::new(move |value| {
            match guards.iter().position(|guard| guard.is(value)) {
                Some(i) => resolved[i].show(value),
                None => {
                    tracing::warn!("value matches no union member, showing as json");
                    value.to_string()
                }
            }
        }))
    }

    fn index_signature(value: Self) -> Self {
        Show::new(move |input| {
            let Value::Object(map) = input else {
                return input.to_string();
            };
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::from(k.as_str()), value.show(v)))
                .collect();
            braces(&parts)
        })
    }

    fn refined(inner: Self, _constraint: Constraint) -> Self {
        inner
    }
}

fn braces(parts: &[String]) -> String {
    if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    }
}
