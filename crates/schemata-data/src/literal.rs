//! # `literal` — A Single Constant Value
//!
//! Each literal gets its own declaration identity derived from the
//! constant's compact JSON form, so `literal(json!(1))` and
//! `literal(json!("1"))` never share an interpretation.

use proptest::prelude::*;
use schemata_core::schema::declare;
use schemata_core::{
    Arbitrary, DecodeError, Decoder, Encoder, Factory, Guard, Identity, Provider, Schema, Show,
    Value,
};

/// Identity prefix; the constant's JSON text is appended.
pub const ID_PREFIX: &str = "schemata/data/literal/";

pub fn id(constant: &Value) -> Identity {
    Identity::new(format!("{ID_PREFIX}{constant}"))
}

pub fn provider(constant: Value) -> Provider {
    let (g, d, a, s) = (constant.clone(), constant.clone(), constant.clone(), constant.clone());
    Provider::make(
        id(&constant),
        [
            Factory::guard(move |_| {
                let expected = g.clone();
                Guard::new(move |input| *input == expected)
            }),
            Factory::decoder(move |_| {
                let expected = d.clone();
                Decoder::new(move |input| {
                    if *input == expected {
                        Ok(input.clone())
                    } else {
                        Err(DecodeError::not_type(expected.to_string(), input))
                    }
                })
            }),
            Factory::encoder(|_| Encoder::identity()),
            Factory::arbitrary(move |_| {
                let value = a.clone();
                Arbitrary::new(move |_| Just(value.clone()).boxed())
            }),
            Factory::show(move |_| {
                let text = s.to_string();
                Show::new(move |_| text.clone())
            }),
        ],
    )
}

/// Schema accepting exactly `constant`.
pub fn schema(constant: Value) -> Schema<Value> {
    declare(id(&constant), provider(constant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::{DecodeErrorKind, Registry};
    use schemata_interpret::{decoder_for, guard_for, show_for};
    use serde_json::json;

    #[test]
    fn identity_distinguishes_json_types() {
        assert_ne!(id(&json!(1)), id(&json!("1")));
        assert_eq!(id(&json!("a")).as_str(), "schemata/data/literal/\"a\"");
    }

    #[test]
    fn accepts_only_the_constant() {
        let registry = Registry::empty();
        let guard = guard_for(&schema(json!("on")), &registry).unwrap();
        assert!(guard.is(&json!("on")));
        assert!(!guard.is(&json!("off")));
        assert!(!guard.is(&json!(null)));
    }

    #[test]
    fn decode_failure_names_the_constant() {
        let registry = Registry::empty();
        let decoder = decoder_for(&schema(json!(3)), &registry).unwrap();
        assert_eq!(decoder.decode(&json!(3)).unwrap(), json!(3));
        let err = decoder.decode(&json!(4)).unwrap_err();
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::NotType {
                expected: "3".into()
            }
        );
    }

    #[test]
    fn shows_compact_json() {
        let registry = Registry::empty();
        let show = show_for(&schema(json!("x")), &registry).unwrap();
        assert_eq!(show.show(&json!("x")), "\"x\"");
    }
}
