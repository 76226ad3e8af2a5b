//! Identity primitives for protonorm.
//!
//! Every entity in the flat tables is addressed by a pair:
//! - [`TypeKey`] — the lowercased fully-qualified message type name
//! - [`Id`] — the entity's own `id` value, or a key supplied by the caller
//!
//! Both the normalizer and the denormalizer resolve identity through these
//! types, so the two passes always agree on where an entity lives.

mod ids;
mod type_key;

pub use ids::Id;
pub use type_key::TypeKey;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building identity values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),
}
