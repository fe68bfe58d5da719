//! # schemata-core — Schema AST, Capabilities, and Providers
//!
//! This crate defines the data every other schemata crate builds on. A
//! schema is authored once as plain data; `schemata-interpret` then derives
//! a guard, decoder, encoder, arbitrary, and printer from it.
//!
//! ## Key Design Principles
//!
//! 1. **Schemas are inert data.** Constructors never fail and never consult
//!    a provider. `Schema<A>` tags a shared [`SchemaNode`] with the type it
//!    describes.
//!
//! 2. **Explicit registries, no ambient registration.** A [`Registry`] is a
//!    value merged from [`Provider`]s and passed into each resolution, so
//!    resolution is a pure function of `(schema, registry)`.
//!
//! 3. **Dispatch by identity.** Declared nodes carry an [`Identity`]; each
//!    capability kind is a variant of [`Factory`] / [`Capability`] and is
//!    selected by pattern matching.
//!
//! 4. **Errors are trees.** A [`DecodeError`] keeps kind, offending input,
//!    and path-attached children so tooling can navigate it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemata-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No I/O. Randomness comes from the caller's `TestRunner`.

pub mod capability;
pub mod config;
pub mod decode_error;
pub mod error;
pub mod identity;
pub mod provider;
pub mod refinement;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use capability::{
    Arbitrary, Capability, CapabilityKind, Decoder, Encoder, GenContext, Guard, Show,
};
pub use config::GenerationConfig;
pub use decode_error::{CompositeTag, DecodeError, DecodeErrorKind, PathSegment};
pub use error::{ConfigError, GenerationError, ResolveError};
pub use identity::Identity;
pub use provider::{Factory, Provider, Registry};
pub use refinement::{Bounds, Constraint, Measurement};
pub use schema::{Schema, SchemaKind, SchemaNode};
pub use serde_json::Value;
