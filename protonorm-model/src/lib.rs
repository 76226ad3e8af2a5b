//! Message reflection for protonorm.
//!
//! The normalizer and denormalizer never see concrete message structs. They
//! work against the capability set defined here:
//! - [`SchemaPool`] — a validated registry of message types, loaded from a JSON
//!   schema document or assembled in code
//! - [`MessageDescriptor`] / [`FieldDescriptor`] — declared fields in stable
//!   order, repeated flags, and resolved nested message types
//! - [`DynamicMessage`] — a message instance with get/set by field name and an
//!   encoded byte form for producing independent copies
//! - [`Value`] — the closed set of field values

mod error;
mod message;
mod schema;
mod value;

pub use error::{ModelError, ModelResult};
pub use message::DynamicMessage;
pub use schema::{
    FieldDescriptor, FieldKind, FieldSchema, MessageDescriptor, MessageSchema, ScalarType,
    SchemaPool, SchemaPoolBuilder,
};
pub use value::Value;
