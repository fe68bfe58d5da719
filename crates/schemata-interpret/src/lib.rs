//! # schemata-interpret — Capability Resolution
//!
//! Derives every runtime interpretation of a schema from one definition:
//!
//! - [`guard_for`] — structural type guard.
//! - [`decoder_for`] — decoder from untyped input, with an error tree.
//! - [`encoder_for`] — encoder to untyped output.
//! - [`arbitrary_for`] — proptest strategy builder for property tests.
//! - [`show_for`] — pretty-printer.
//!
//! Each entry point runs one resolution pass (see [`resolver`]) over the
//! caller's [`Registry`]. Resolution is a pure function of
//! `(schema, registry)`; nothing is registered globally.
//!
//! ## Soundness
//!
//! For every schema `S`, every sample drawn from `arbitrary_for(S)` is
//! accepted by `guard_for(S)`, and for every guard-accepted value `a`,
//! `decode(encode(a))` succeeds and yields `a`.
//!
//! ## Crate Policy
//!
//! - Depends only on `schemata-core` internally.
//! - Resolution failures are returned, never panicked.
//! - Decoding never short-circuits inside structs, tuples, arrays, or index
//!   signatures; unions are first-match-wins in declaration order.

pub mod resolver;

mod arbitrary;
mod decoder;
mod encoder;
mod guard;
mod show;

pub use resolver::{Interpretation, Resolver};

use schemata_core::{
    Arbitrary, Capability, CapabilityKind, Decoder, Encoder, Guard, Registry, ResolveError, Schema,
    SchemaNode, Show,
};

/// Resolve the guard of `schema`.
pub fn guard_for<A>(schema: &Schema<A>, registry: &Registry) -> Result<Guard<A>, ResolveError> {
    resolve_as::<Guard>(schema.as_node(), registry).map(Guard::cast)
}

/// Resolve the decoder of `schema`.
pub fn decoder_for<A>(
    schema: &Schema<A>,
    registry: &Registry,
) -> Result<Decoder<A>, ResolveError> {
    resolve_as::<Decoder>(schema.as_node(), registry).map(Decoder::cast)
}

/// Resolve the encoder of `schema`.
pub fn encoder_for<A>(
    schema: &Schema<A>,
    registry: &Registry,
) -> Result<Encoder<A>, ResolveError> {
    resolve_as::<Encoder>(schema.as_node(), registry).map(Encoder::cast)
}

/// Resolve the arbitrary of `schema`.
pub fn arbitrary_for<A>(
    schema: &Schema<A>,
    registry: &Registry,
) -> Result<Arbitrary<A>, ResolveError> {
    resolve_as::<Arbitrary>(schema.as_node(), registry).map(Arbitrary::cast)
}

/// Resolve the printer of `schema`.
pub fn show_for<A>(schema: &Schema<A>, registry: &Registry) -> Result<Show<A>, ResolveError> {
    resolve_as::<Show>(schema.as_node(), registry).map(Show::cast)
}

/// Resolve `node` for a kind chosen at runtime.
pub fn resolve(
    node: &SchemaNode,
    registry: &Registry,
    kind: CapabilityKind,
) -> Result<Capability, ResolveError> {
    match kind {
        CapabilityKind::Guard => resolve_as::<Guard>(node, registry).map(Capability::Guard),
        CapabilityKind::Decoder => resolve_as::<Decoder>(node, registry).map(Capability::Decoder),
        CapabilityKind::Encoder => resolve_as::<Encoder>(node, registry).map(Capability::Encoder),
        CapabilityKind::Arbitrary => {
            resolve_as::<Arbitrary>(node, registry).map(Capability::Arbitrary)
        }
        CapabilityKind::Show => resolve_as::<Show>(node, registry).map(Capability::Show),
    }
}

fn resolve_as<C: Interpretation>(node: &SchemaNode, registry: &Registry) -> Result<C, ResolveError> {
    Resolver::new(registry).resolve(node)
}

/// All five capabilities of one schema.
#[derive(Debug)]
pub struct Capabilities<A> {
    pub guard: Guard<A>,
    pub decoder: Decoder<A>,
    pub encoder: Encoder<A>,
    pub arbitrary: Arbitrary<A>,
    pub show: Show<A>,
}

impl<A> Clone for Capabilities<A> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            decoder: self.decoder.clone(),
            encoder: self.encoder.clone(),
            arbitrary: self.arbitrary.clone(),
            show: self.show.clone(),
        }
    }
}

/// Resolve every capability of `schema`, failing on the first missing one.
pub fn interpret<A>(schema: &Schema<A>, registry: &Registry) -> Result<Capabilities<A>, ResolveError> {
    Ok(Capabilities {
        guard: guard_for(schema, registry)?,
        decoder: decoder_for(schema, registry)?,
        encoder: encoder_for(schema, registry)?,
        arbitrary: arbitrary_for(schema, registry)?,
        show: show_for(schema, registry)?,
    })
}
