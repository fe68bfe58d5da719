//! # `string` — UTF-8 Strings
//!
//! Lengths are measured in chars, matching the `minLength` / `maxLength`
//! refinements, and generation draws the char count inside the current
//! length bounds.

use proptest::prelude::*;
use schemata_core::schema::declare;
use schemata_core::{Arbitrary, Decoder, Encoder, Factory, Guard, Identity, Provider, Schema, Show, Value};

pub const ID: &str = "schemata/data/string";

pub fn id() -> Identity {
    Identity::new(ID)
}

pub fn provider() -> Provider {
    Provider::make(
        id(),
        [
            Factory::guard(|_| guard()),
            Factory::decoder(|_| Decoder::from_guard(guard(), "string")),
            Factory::encoder(|_| Encoder::identity()),
            Factory::arbitrary(|_| {
                Arbitrary::new(|ctx| {
                    let (lo, hi) = ctx.bounds().length_range(ctx.config().max_length);
                    prop::collection::vec(any::<char>(), lo..=hi)
                        .prop_map(|chars| Value::String(chars.into_iter().collect()))
                        .boxed()
                })
            }),
            Factory::show(|_| Show::new(Value::to_string)),
        ],
    )
}

fn guard() -> Guard {
    Guard::new(Value::is_string)
}

pub fn schema() -> Schema<String> {
    declare(id(), provider())
}
