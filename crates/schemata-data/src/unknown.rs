//! # `unknown` — Accepts Any Value
//!
//! Guard accepts everything, decode and encode are the identity, and
//! samples are arbitrary float-free JSON documents.

use proptest::prelude::*;
use schemata_core::schema::declare;
use schemata_core::{Arbitrary, Decoder, Encoder, Factory, Guard, Identity, Provider, Schema, Show, Value};

/// Canonical identity name.
pub const ID: &str = "schemata/data/unknown";

pub fn id() -> Identity {
    Identity::new(ID)
}

/// Capability factories for `unknown`.
pub fn provider() -> Provider {
    Provider::make(
        id(),
        [
            Factory::guard(|_| Guard::new(|_| true)),
            Factory::decoder(|_| Decoder::new(|input| Ok(input.clone()))),
            Factory::encoder(|_| Encoder::identity()),
            Factory::arbitrary(|_| {
                Arbitrary::new(|ctx| {
                    let depth = u32::try_from(ctx.config().max_depth).unwrap_or(u32::MAX);
                    let size = u32::try_from(ctx.config().max_length).unwrap_or(u32::MAX);
                    json_value(depth, size).boxed()
                })
            }),
            Factory::show(|_| Show::new(|_| "<unknown>".to_string())),
        ],
    )
}

/// Schema accepting any value.
pub fn schema() -> Schema<Value> {
    declare(id(), provider())
}

/// Float-free JSON values, nested at most `depth` levels.
fn json_value(depth: u32, size: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9_ ]{0,16}".prop_map(Value::String),
    ];
    let items = size as usize;
    leaf.prop_recursive(depth, size.saturating_mul(4), size, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..=items).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..=items)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}
