//! # `boolean`

use proptest::prelude::*;
use schemata_core::schema::declare;
use schemata_core::{Arbitrary, Decoder, Encoder, Factory, Guard, Identity, Provider, Schema, Show, Value};

pub const ID: &str = "schemata/data/boolean";

pub fn id() -> Identity {
    Identity::new(ID)
}

pub fn provider() -> Provider {
    Provider::make(
        id(),
        [
            Factory::guard(|_| guard()),
            Factory::decoder(|_| Decoder::from_guard(guard(), "boolean")),
            Factory::encoder(|_| Encoder::identity()),
            Factory::arbitrary(|_| Arbitrary::new(|_| any::<bool>().prop_map(Value::Bool).boxed())),
            Factory::show(|_| Show::new(Value::to_string)),
        ],
    )
}

fn guard() -> Guard {
    Guard::new(Value::is_boolean)
}

pub fn schema() -> Schema<bool> {
    declare(id(), provider())
}
