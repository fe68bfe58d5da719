//! # schemata-data — Declared Leaf Schemas
//!
//! Ready-made declarations built on the `schemata-core` API:
//!
//! | Module | Schema | Representation |
//! |--------|--------|----------------|
//! | [`unknown`] | any value | as-is |
//! | [`string`] | `String` | JSON string |
//! | [`number`] | `f64` | JSON number |
//! | [`boolean`] | `bool` | JSON boolean |
//! | [`literal`] | one constant | the constant |
//! | [`set`] | `Set<A>` | array of distinct `A` |
//!
//! Each declared node carries its own provider, so these schemas resolve
//! against an empty registry. [`registry`] merges the parameterless
//! providers for callers that want an explicit table to extend or shadow.

pub mod boolean;
pub mod literal;
pub mod number;
pub mod set;
pub mod string;
pub mod unknown;

use schemata_core::{Provider, Registry, Schema, Value};

pub fn string() -> Schema<String> {
    string::schema()
}

pub fn number() -> Schema<f64> {
    number::schema()
}

pub fn boolean() -> Schema<bool> {
    boolean::schema()
}

pub fn unknown() -> Schema<Value> {
    unknown::schema()
}

/// The `of` schema: exactly `constant`.
pub fn literal(constant: impl Into<Value>) -> Schema<Value> {
    literal::schema(constant.into())
}

pub fn set<A>(item: Schema<A>) -> Schema<Vec<A>> {
    set::schema(item)
}

/// Providers for every built-in declaration identity.
pub fn providers() -> Vec<Provider> {
    vec![
        unknown::provider(),
        string::provider(),
        number::provider(),
        boolean::provider(),
        set::provider(),
    ]
}

/// Registry merged from [`providers`].
pub fn registry() -> Registry {
    Registry::merge(&providers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::CapabilityKind;

    #[test]
    fn registry_covers_every_kind_of_every_builtin() {
        let registry = registry();
        for provider in providers() {
            for kind in CapabilityKind::ALL {
                assert!(
                    registry.contains(provider.identity(), kind),
                    "{} lacks {kind}",
                    provider.identity()
                );
            }
        }
    }
}
