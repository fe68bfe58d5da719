//! # Error Types
//!
//! Three failure classes exist:
//!
//! - Construction never fails. Schemas and providers are plain data.
//! - Resolution fails with [`ResolveError`] when a declared node has no
//!   factory for the requested capability. This is a configuration defect
//!   and aborts the whole resolution.
//! - Decoding fails with a [`DecodeError`](crate::DecodeError) tree, an
//!   ordinary value the caller branches on.
//!
//! Generation and configuration loading have their own small error types.

use thiserror::Error;

use crate::capability::CapabilityKind;
use crate::identity::Identity;

/// A schema could not be turned into a capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No provider supplies `kind` for the declaration `identity`.
    #[error("no {kind} registered for declaration `{identity}` at {path}")]
    MissingCapability {
        /// The declaration that could not be interpreted.
        identity: Identity,
        /// The capability that was requested.
        kind: CapabilityKind,
        /// Location of the declaration inside the resolved schema.
        path: String,
    },
}

/// Sample generation was rejected by the generation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The strategy could not produce a value, usually because a
    /// refinement filter rejected too many candidates.
    #[error("sample generation rejected: {0}")]
    Rejected(String),
}

/// A generation config document could not be parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// YAML parse or shape error.
    #[error("invalid yaml config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse or shape error.
    #[error("invalid json config: {0}")]
    Json(#[from] serde_json::Error),
}
