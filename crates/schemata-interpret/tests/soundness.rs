//! # Soundness Law
//!
//! Every sample drawn from a schema's arbitrary must satisfy the same
//! schema's guard, and must survive `decode(encode(sample))` unchanged.
//! Each schema is sampled 100 times from a deterministic runner.

use proptest::test_runner::TestRunner;
use schemata_core::schema::{array, index_signature, lazy, struct_, tuple, union};
use schemata_core::{GenerationConfig, Identity, Registry, Schema, Value};
use schemata_data::{boolean, literal, number, set, string, unknown};
use schemata_interpret::interpret;
use serde_json::json;

const SAMPLES: usize = 100;

fn assert_sound<A>(schema: Schema<A>) {
    let caps = interpret(&schema, &Registry::empty()).expect("schema should resolve");
    let mut runner = TestRunner::deterministic();
    let samples = caps
        .arbitrary
        .sample(GenerationConfig::default(), &mut runner, SAMPLES)
        .expect("sampling should not exhaust rejections");
    assert_eq!(samples.len(), SAMPLES);
    for sample in &samples {
        assert!(caps.guard.is(sample), "guard rejected sample {sample}");
        let encoded = caps.encoder.encode(sample);
        let decoded = caps
            .decoder
            .decode(&encoded)
            .unwrap_or_else(|e| panic!("round trip of {sample} failed:\n{e}"));
        assert_eq!(&decoded, sample);
    }
}

#[test]
fn leaves_are_sound() {
    assert_sound(string());
    assert_sound(number());
    assert_sound(boolean());
    assert_sound(unknown());
    assert_sound(literal("fixed"));
    assert_sound(literal(json!({"a": [1, 2]})));
}

#[test]
fn composites_are_sound() {
    assert_sound::<(String, f64)>(tuple([string().node(), number().node()]));
    assert_sound::<Value>(union(string(), number(), [literal(json!(null)).node()]));
    assert_sound::<Value>(struct_([
        ("name", string().node()),
        ("age", number().node()),
        ("tags", array(string()).node()),
    ]));
    assert_sound(index_signature(boolean()));
    assert_sound(array(array(number())));
    assert_sound(set(string()));
    assert_sound(set(union::<Value>(number(), boolean(), [])));
}

#[test]
fn refinements_are_sound() {
    assert_sound(string().min_length(1));
    assert_sound(string().max_length(2));
    assert_sound(number().minimum(1.0));
    assert_sound(number().maximum(1.0));
    assert_sound(string().min_length(2).max_length(3));
    assert_sound(array(boolean()).min_length(1));
    assert_sound(array(number().minimum(0.0).maximum(1.0)).max_length(2));
}

#[test]
fn contradictory_refinement_reports_rejection() {
    let schema = string().min_length(3).max_length(1);
    let caps = interpret(&schema, &Registry::empty()).unwrap();
    let mut runner = TestRunner::deterministic();
    assert!(caps
        .arbitrary
        .sample(GenerationConfig::default(), &mut runner, 1)
        .is_err());
}

struct Category;

fn category() -> Schema<Category> {
    lazy(Identity::new("test/Category"), || {
        struct_([
            ("name", string().node()),
            ("subcategories", array(category()).node()),
        ])
    })
}

#[test]
fn recursive_schema_is_sound() {
    assert_sound(category());
}

#[test]
fn recursive_union_with_leaf_first_is_sound() {
    fn expr() -> Schema<Value> {
        lazy(Identity::new("test/Expr"), || {
            union(
                number(),
                tuple::<Value>([literal("neg").node(), expr().node()]),
                [tuple::<Value>([literal("add").node(), expr().node(), expr().node()]).node()],
            )
        })
    }
    assert_sound(expr());
}

#[test]
fn recursive_union_with_recursive_member_first_is_sound() {
    fn list() -> Schema<Value> {
        lazy(Identity::new("test/List"), || {
            union(
                tuple::<Value>([number().node(), list().node()]),
                literal(json!(null)),
                [],
            )
        })
    }
    assert_sound(list());
}

#[test]
fn struct_with_undeclared_keys_round_trips() {
    let schema: Schema<Value> = struct_([("a", number().node())]);
    let caps = interpret(&schema, &Registry::empty()).unwrap();
    let value = json!({"a": 1, "x": true});
    assert!(caps.guard.is(&value));
    assert_eq!(caps.decoder.decode(&caps.encoder.encode(&value)).unwrap(), value);
}

#[test]
fn generation_respects_configured_max_length() {
    let config = GenerationConfig::from_yaml_str("max_length: 2").unwrap();
    let caps = interpret(&array(number()), &Registry::empty()).unwrap();
    let mut runner = TestRunner::deterministic();
    for sample in caps.arbitrary.sample(config, &mut runner, SAMPLES).unwrap() {
        let len = sample.as_array().map(Vec::len).unwrap_or_default();
        assert!(len <= 2, "{sample}");
    }
}
