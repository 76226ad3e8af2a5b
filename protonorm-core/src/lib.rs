//! Bidirectional graph flattening for structured messages.
//!
//! - [`normalize`] / [`Normalizer`] — walk a message graph depth-first, pull
//!   every sub-message that carries an id into flat per-type tables, and record
//!   which parent fields referenced which child ids
//! - [`denormalize`] / [`denormalize_many`] — rebuild independent nested copies
//!   from those tables, starting at a root type and id(s)
//! - [`Validator`], [`RequiredFields`], [`combine`] — acceptance predicates
//!   applied to rebuilt roots
//! - [`get_normalizations`] — raw lookup of a recorded field reference
//!
//! Tables are keyed by [`TypeKey`] (lowercased fully-qualified type name) and
//! [`Id`]. They are plain values: callers own them and merge successive
//! normalize calls with [`NormalizedState::absorb`].

mod denormalize;
mod error;
mod merge;
mod normalize;
mod shape;
mod state;
mod validate;

pub use denormalize::{
    Denormalized, MAX_DEPTH, denormalize, denormalize_many, get_normalizations, reattach,
};
pub use error::{CoreError, CoreResult};
pub use merge::{EntityMerger, MergeStrategy};
pub use normalize::{Normalized, NormalizedValue, Normalizer, normalize};
pub use state::{FieldNormalization, NormalizationRecord, NormalizedState};
pub use validate::{Combined, RequiredFields, Validator, combine};

pub use protonorm_types::{Id, TypeKey};
