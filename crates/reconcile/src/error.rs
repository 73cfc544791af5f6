//! Error types for reconciliation sessions.
//!
//! Errors fall into two groups: internal conditions the engine detects
//! itself (unresolved references, inconsistent future population) and
//! failures surfaced by a builder's remote operations, which travel as
//! [`anyhow::Error`] through the [`Error::Builder`] variant.

use serde_json::Value as Json;
use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while applying a session.
#[derive(Debug, Error)]
pub enum Error {
    /// Materialization hit a reference to a future that has not resolved.
    ///
    /// Fatal to the current apply; the session never retries it.
    #[error("unresolved reference to attribute {attribute:?}")]
    UnresolvedReference {
        /// Attribute the reference was waiting on.
        attribute: String,
    },

    /// A reference named an attribute the resolved spec does not carry.
    #[error("resolved resource spec has no attribute {attribute:?}")]
    MissingAttribute {
        /// Attribute that was looked up.
        attribute: String,
    },

    /// A deferred sum materialized a non-string operand.
    #[error("cannot concatenate non-string value {value}")]
    NotConcatenable {
        /// The offending materialized value.
        value: Json,
    },

    /// A future was populated twice with differing specs.
    ///
    /// This is a builder or controller bug, not a remote condition.
    #[error("future repopulated with a different spec: had {previous}, got {conflicting}")]
    InternalConsistency {
        /// Spec the future already held.
        previous: Json,
        /// Spec of the conflicting second population.
        conflicting: Json,
    },

    /// A builder operation (fetch, create, poll, delete) failed.
    #[error(transparent)]
    Builder(#[from] anyhow::Error),
}
