//! # `number` — Finite Numbers
//!
//! Samples are drawn uniformly from the current numeric bounds; an open
//! side extends `number_span` from the other bound (or from zero).

use proptest::prelude::*;
use schemata_core::schema::declare;
use schemata_core::{Arbitrary, Decoder, Encoder, Factory, Guard, Identity, Provider, Schema, Show, Value};

pub const ID: &str = "schemata/data/number";

pub fn id() -> Identity {
    Identity::new(ID)
}

pub fn provider() -> Provider {
    Provider::make(
        id(),
        [
            Factory::guard(|_| guard()),
            Factory::decoder(|_| Decoder::from_guard(guard(), "number")),
            Factory::encoder(|_| Encoder::identity()),
            Factory::arbitrary(|_| {
                Arbitrary::new(|ctx| {
                    let (lo, hi) = ctx.number_range();
                    if lo >= hi {
                        return Just(Value::from(lo)).boxed();
                    }
                    (lo..=hi).prop_map(Value::from).boxed()
                })
            }),
            Factory::show(|_| Show::new(Value::to_string)),
        ],
    )
}

fn guard() -> Guard {
    Guard::new(Value::is_number)
}

pub fn schema() -> Schema<f64> {
    declare(id(), provider())
}
