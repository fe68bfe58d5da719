//! # `set` — Parameterised Set Declaration
//!
//! A set of `A` is represented as an array of distinct `A` values. The
//! item schema is a type parameter of the declaration, so every factory
//! receives the item's capability for the same kind.

use proptest::prelude::*;
use schemata_core::schema::declare_with;
use schemata_core::{
    Arbitrary, CompositeTag, DecodeError, Decoder, Encoder, Factory, Guard, Identity,
    PathSegment, Provider, Schema, Show, Value,
};

pub const ID: &str = "schemata/data/Set";

pub fn id() -> Identity {
    Identity::new(ID)
}

fn all_distinct(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, v)| !items[..i].contains(v))
}

pub fn provider() -> Provider {
    Provider::make(
        id(),
        [
            Factory::guard(|params| {
                let Some(item) = params.first().cloned() else {
                    return Guard::new(|_| false);
                };
                Guard::new(move |input| match input {
                    Value::Array(items) => all_distinct(items) && items.iter().all(|v| item.is(v)),
                    _ => false,
                })
            }),
            Factory::decoder(|params| {
                let Some(item) = params.first().cloned() else {
                    return Decoder::new(|input| Err(DecodeError::not_type("Set", input)));
                };
                Decoder::new(move |input| {
                    let Value::Array(items) = input else {
                        return Err(DecodeError::not_type("Set", input));
                    };
                    let mut out = Vec::with_capacity(items.len());
                    let mut errors = Vec::new();
                    for (i, v) in items.iter().enumerate() {
                        match item.decode(v) {
                            Ok(decoded) => out.push(decoded),
                            Err(e) => errors.push((PathSegment::Index(i), e)),
                        }
                    }
                    if !errors.is_empty() {
                        return Err(DecodeError::composite(CompositeTag::Array, input, errors));
                    }
                    if !all_distinct(&out) {
                        return Err(DecodeError::not_type("Set", input));
                    }
                    Ok(Value::Array(out))
                })
            }),
            Factory::encoder(|params| {
                let Some(item) = params.first().cloned() else {
                    return Encoder::identity();
                };
                Encoder::new(move |value| match value {
                    Value::Array(items) => Value::Array(items.iter().map(|v| item.encode(v)).collect()),
                    other => other.clone(),
                })
            }),
            Factory::arbitrary(|params| {
                let Some(item) = params.first().cloned() else {
                    return Arbitrary::new(|_| Just(Value::Array(Vec::new())).boxed());
                };
                Arbitrary::new(move |ctx| {
                    let (lo, hi) = ctx.length_range();
                    prop::collection::vec(item.build(&ctx.descend()), lo..=hi)
                        .prop_map(|candidates| {
                            let mut distinct: Vec<Value> = Vec::with_capacity(candidates.len());
                            for v in candidates {
                                if !distinct.contains(&v) {
                                    distinct.push(v);
                                }
                            }
                            Value::Array(distinct)
                        })
                        .boxed()
                })
            }),
            Factory::show(|params| {
                let Some(item) = params.first().cloned() else {
                    return Show::new(Value::to_string);
                };
                Show::new(move |value| match value {
                    Value::Array(items) => {
                        let parts: Vec<String> = items.iter().map(|v| item.show(v)).collect();
                        format!("Set([{}])", parts.join(", "))
                    }
                    other => other.to_string(),
                })
            }),
        ],
    )
}

/// Set of `item` values.
pub fn schema<A>(item: Schema<A>) -> Schema<Vec<A>> {
    declare_with(id(), provider(), vec![item.node()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{number, string};
    use proptest::test_runner::TestRunner;
    use schemata_core::{DecodeErrorKind, GenerationConfig, Registry};
    use schemata_interpret::interpret;
    use serde_json::json;

    #[test]
    fn guard_requires_distinct_valid_items() {
        let caps = interpret(&schema(string::schema()), &Registry::empty()).unwrap();
        assert!(caps.guard.is(&json!([])));
        assert!(caps.guard.is(&json!(["a", "b"])));
        assert!(!caps.guard.is(&json!(["a", "a"])));
        assert!(!caps.guard.is(&json!(["a", 1])));
        assert!(!caps.guard.is(&json!({"a": "a"})));
    }

    #[test]
    fn decoder_reports_every_bad_item_then_duplicates() {
        let caps = interpret(&schema(number::schema()), &Registry::empty()).unwrap();
        let err = caps.decoder.decode(&json!([1, "x", 2, true])).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::Composite(CompositeTag::Array));
        let indices: Vec<_> = err.children().iter().map(|(s, _)| s.clone()).collect();
        assert_eq!(indices, vec![PathSegment::Index(1), PathSegment::Index(3)]);

        let dup = caps.decoder.decode(&json!([1, 1])).unwrap_err();
        assert_eq!(
            dup.kind(),
            &DecodeErrorKind::NotType {
                expected: "Set".into()
            }
        );
    }

    #[test]
    fn show_wraps_items() {
        let caps = interpret(&schema(string::schema()), &Registry::empty()).unwrap();
        assert_eq!(caps.show.show(&json!(["a"])), "Set([\"a\"])");
        assert_eq!(caps.show.show(&json!([])), "Set([])");
    }

    #[test]
    fn samples_are_sets() {
        let caps = interpret(&schema(string::schema()), &Registry::empty()).unwrap();
        let mut runner = TestRunner::deterministic();
        let samples = caps
            .arbitrary
            .sample(GenerationConfig::default(), &mut runner, 50)
            .unwrap();
        for sample in &samples {
            assert!(caps.guard.is(sample), "{sample}");
        }
    }

    #[test]
    fn missing_type_parameter_does_not_panic() {
        let bare: Schema<()> = declare_with(id(), provider(), Vec::new());
        let caps = interpret(&bare, &Registry::empty()).unwrap();
        assert!(!caps.guard.is(&json!([])));
        assert!(caps.decoder.decode(&json!([])).is_err());
    }
}
