//! Error types for the reflection layer.

use thiserror::Error;

/// Result type for reflection operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building schemas or manipulating messages.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A message type name did not resolve in the pool.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// Two message schemas share a type key (fully-qualified name, ignoring
    /// case).
    #[error("duplicate message type: {0}")]
    DuplicateType(String),

    /// A message schema declares the same field twice.
    #[error("duplicate field {field} on {message}")]
    DuplicateField { message: String, field: String },

    /// A field name is not declared on the message type.
    #[error("unknown field {field} on {message}")]
    UnknownField { message: String, field: String },

    /// A value does not fit the field's declared kind.
    #[error("type mismatch on {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Invalid identity value or type name.
    #[error(transparent)]
    Identity(#[from] protonorm_types::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
