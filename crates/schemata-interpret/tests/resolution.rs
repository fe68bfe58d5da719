//! Resolution through the public entry points: registry precedence,
//! missing capabilities, runtime kind dispatch, and lazy realization.

use std::sync::atomic::{AtomicUsize, Ordering};

use schemata_core::schema::{array, declare, lazy, struct_, union};
use schemata_core::{
    CapabilityKind, Encoder, Factory, Guard, Identity, Provider, Registry, ResolveError, Schema,
    Value,
};
use schemata_data::{number, string};
use schemata_interpret::{
    arbitrary_for, decoder_for, encoder_for, guard_for, interpret, resolve, show_for,
};
use serde_json::json;

/// A declaration that only knows how to guard.
fn guard_only() -> Schema<Value> {
    let id = Identity::new("test/guard-only");
    declare(
        id.clone(),
        Provider::make(id, [Factory::guard(|_| Guard::new(Value::is_null))]),
    )
}

#[test]
fn missing_capability_fails_resolution_not_construction() {
    let schema: Schema<Value> = struct_([("items", array(guard_only()).node())]);
    let registry = Registry::empty();
    assert!(guard_for(&schema, &registry).is_ok());

    let err = decoder_for(&schema, &registry).unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingCapability {
            identity: Identity::new("test/guard-only"),
            kind: CapabilityKind::Decoder,
            path: "$.items[*]".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "no decoder registered for declaration `test/guard-only` at $.items[*]"
    );
    assert!(encoder_for(&schema, &registry).is_err());
    assert!(arbitrary_for(&schema, &registry).is_err());
    assert!(show_for(&schema, &registry).is_err());
    assert!(interpret(&schema, &registry).is_err());
}

#[test]
fn missing_capability_in_union_member_names_member() {
    let schema: Schema<Value> = union(number(), guard_only(), []);
    let err = show_for(&schema, &Registry::empty()).unwrap_err();
    let ResolveError::MissingCapability { path, .. } = err;
    assert_eq!(path, "$<1>");
}

#[test]
fn caller_registry_completes_a_partial_provider() {
    let completion = Provider::make(
        Identity::new("test/guard-only"),
        [Factory::encoder(|_| Encoder::new(|_| json!("encoded")))],
    );
    let registry = Registry::from(&completion);
    let encoder = encoder_for(&guard_only(), &registry).unwrap();
    assert_eq!(encoder.encode(&Value::Null), json!("encoded"));
    // Guard still comes from the attached provider.
    assert!(guard_for(&guard_only(), &registry).unwrap().is(&Value::Null));
}

#[test]
fn caller_registry_overrides_builtin() {
    let loose_string = Provider::make(
        schemata_data::string::id(),
        [Factory::guard(|_| Guard::new(|_| true))],
    );
    let registry = Registry::merge([&loose_string]).combine(&schemata_data::registry());
    let guard = guard_for(&string(), &registry).unwrap();
    assert!(guard.is(&json!(42)));
}

#[test]
fn runtime_kind_dispatch_returns_matching_capability() {
    let registry = schemata_data::registry();
    let node = number().node();
    for kind in CapabilityKind::ALL {
        let capability = resolve(&node, &registry, kind).unwrap();
        assert_eq!(capability.kind(), kind);
    }
}

#[test]
fn lazy_producer_runs_once_across_passes() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let schema: Schema<Vec<f64>> = lazy(Identity::new("test/Numbers"), || {
        CALLS.fetch_add(1, Ordering::SeqCst);
        array(number())
    });
    let caps = interpret(&schema, &Registry::empty()).unwrap();
    assert!(caps.guard.is(&json!([1, 2])));
    assert!(!caps.guard.is(&json!(["x"])));
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn mutually_recursive_schemas_resolve() {
    fn forest() -> Schema<Vec<Value>> {
        lazy(Identity::new("test/Forest"), || array(tree()))
    }
    fn tree() -> Schema<Value> {
        lazy(Identity::new("test/Tree"), || {
            struct_([("value", number().node()), ("children", forest().node())])
        })
    }
    let caps = interpret(&forest(), &Registry::empty()).unwrap();
    let value = json!([
        {"value": 1, "children": []},
        {"value": 2, "children": [{"value": 3, "children": []}]}
    ]);
    assert!(caps.guard.is(&value));
    assert_eq!(caps.decoder.decode(&value).unwrap(), value);
    assert_eq!(caps.encoder.encode(&value), value);
    assert_eq!(
        caps.show.show(&json!([{"value": 1, "children": []}])),
        "[{ value: 1, children: [] }]"
    );

    let err = caps
        .decoder
        .decode(&json!([{"value": 1, "children": [{"value": "x", "children": []}]}]))
        .unwrap_err();
    assert_eq!(err.to_string(), "$[0].children[0].value: expected number, got \"x\"");
}

#[test]
fn string_schema_is_shared_across_fields() {
    let schema: Schema<Value> = struct_([("a", string().node()), ("b", string().node())]);
    let decoder = decoder_for(&schema, &Registry::empty()).unwrap();
    assert_eq!(decoder.decode(&json!({"a": "x", "b": "y"})).unwrap(), json!({"a": "x", "b": "y"}));
}
