//! Error types for normalization and denormalization.

use protonorm_model::ModelError;
use protonorm_types::TypeKey;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Schema/state mismatches found while rebuilding a graph.
///
/// Ordinary absence (unknown type bucket or id at the root, a dangling child
/// id) is never an error; see [`Denormalized`](crate::Denormalized).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A normalization record names a field the message type does not declare.
    #[error("normalization record names unknown field {field} on {message}")]
    UnknownField { message: String, field: String },

    /// A normalization record names a scalar field.
    #[error("field {field} on {message} does not hold messages")]
    NotAMessageField { message: String, field: String },

    /// A record references a child type with no bucket in the entities table.
    #[error("no entities of type {0} to resolve a recorded reference")]
    MissingTypeBucket(TypeKey),

    /// Reattachment nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("reattachment exceeded depth {0}; the tables likely contain a multi-hop cycle")]
    DepthExceeded(usize),

    /// Reflection error while rebuilding a message.
    #[error(transparent)]
    Model(#[from] ModelError),
}
