//! Structural decoders.
//!
//! Struct decoders carry undeclared keys through unchanged, so anything the
//! struct guard accepts decodes to itself.
//!
//! Struct, tuple, array, and index-signature decoders never short-circuit:
//! every failing child is reported under one composite error. Union
//! decoders try members in declaration order and return the first success;
//! this first-match-wins order is the contract when members overlap.

use std::sync::Weak;

use schemata_core::capability::DecodeFn;
use schemata_core::{
    CompositeTag, Constraint, DecodeError, Decoder, PathSegment, ResolveError, SchemaNode, Value,
};
use serde_json::Map;

use crate::resolver::{plumbing, Interpretation, Resolver, Slot};

impl Interpretation for Decoder {
    plumbing!(Decoder, DecodeFn);

    fn forward(slot: Slot<DecodeFn>) -> Self {
        Decoder::new(move |input| match slot.get().and_then(Weak::upgrade) {
            Some(target) => target(input),
            None => Err(DecodeError::not_type("recursive schema", input)),
        })
    }

    fn structure(fields: Vec<(String, Self)>) -> Self {
        Decoder::new(move |input| {
            let Value::Object(map) = input else {
                return Err(DecodeError::not_type("struct", input));
            };
            let mut out = undeclared(map, &fields);
            let mut errors = Vec::new();
            for (name, decoder) in &fields {
                let segment = PathSegment::Key(name.clone());
                match map.get(name) {
                    None => errors.push((segment, DecodeError::missing_field())),
                    Some(v) => match decoder.decode(v) {
                        Ok(decoded) => {
                            out.insert(name.clone(), decoded);
                        }
                        Err(e) => errors.push((segment, e)),
                    },
                }
            }
            if errors.is_empty() {
                Ok(Value::Object(out))
            } else {
                Err(DecodeError::composite(CompositeTag::Struct, input, errors))
            }
        })
    }

    fn tuple(elements: Vec<Self>) -> Self {
        Decoder::new(move |input| {
            let Value::Array(items) = input else {
                return Err(DecodeError::not_type("tuple", input));
            };
            let expected = elements.len();
            if items.len() < expected {
                return Err(DecodeError::smaller_than_expected(expected, input, items.len()));
            }
            if items.len() > expected {
                return Err(DecodeError::bigger_than_expected(expected, input, items.len()));
            }
            decode_positions(CompositeTag::Tuple, input, items, |i| &elements[i])
        })
    }

    fn array(item: Self) -> Self {
        Decoder::new(move |input| {
            let Value::Array(items) = input else {
                return Err(DecodeError::not_type("array", input));
            };
            decode_positions(CompositeTag::Array, input, items, |_| &item)
        })
    }

    fn union(
        _resolver: &mut Resolver<'_>,
        _members: &[SchemaNode],
        resolved: Vec<Self>,
    ) -> Result<Self, ResolveError> {
        Ok(Decoder::new(move |input| {
            let mut errors = Vec::with_capacity(resolved.len());
            for (i, decoder) in resolved.iter().enumerate() {
                match decoder.decode(input) {
                    Ok(decoded) => return Ok(decoded),
                    Err(e) => errors.push((PathSegment::Member(i), e)),
                }
            }
            Err(DecodeError::composite(CompositeTag::Union, input, errors))
        }))
    }

    fn index_signature(value: Self) -> Self {
        Decoder::new(move |input| {
            let Value::Object(map) = input else {
                return Err(DecodeError::not_type("indexSignature", input));
            };
            let mut out = Map::new();
            let mut errors = Vec::new();
            for (key, v) in map {
                match value.decode(v) {
                    Ok(decoded) => {
                        out.insert(key.clone(), decoded);
                    }
                    Err(e) => errors.push((PathSegment::Key(key.clone()), e)),
                }
            }
            if errors.is_empty() {
                Ok(Value::Object(out))
            } else {
                Err(DecodeError::composite(CompositeTag::IndexSignature, input, errors))
            }
        })
    }

    fn refined(inner: Self, constraint: Constraint) -> Self {
        Decoder::new(move |input| {
            let decoded = inner.decode(input)?;
            match constraint.check(&decoded) {
                Ok(()) => Ok(decoded),
                Err(measurement) => Err(DecodeError::constraint(constraint, measurement, &decoded)),
            }
        })
    }
}

/// Entries of `map` whose keys are not declared fields, copied verbatim.
pub(crate) fn undeclared<C>(
    map: &Map<String, Value>,
    fields: &[(String, C)],
) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !fields.iter().any(|(name, _)| name == *key))
        .map(|(key, v)| (key.clone(), v.clone()))
        .collect()
}

/// Decode every element, collecting all failures by index.
fn decode_positions<'a>(
    tag: CompositeTag,
    input: &Value,
    items: &[Value],
    decoder_at: impl Fn(usize) -> &'a Decoder,
) -> Result<Value, DecodeError> {
    let mut out = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, v) in items.iter().enumerate() {
        match decoder_at(i).decode(v) {
            Ok(decoded) => out.push(decoded),
            Err(e) => errors.push((PathSegment::Index(i), e)),
        }
    }
    if errors.is_empty() {
        Ok(Value::Array(out))
    } else {
        Err(DecodeError::composite(tag, input, errors))
    }
}
