//! Denormalizer - rebuilds nested messages from the flat tables.
//!
//! Stored entities are never mutated: every rebuilt message starts as a copy
//! of the stored instance, and recorded child references are reattached to
//! the copy depth-first.
//!
//! Reattachment skips any field whose child type equals the type of the
//! entity that referenced the current one. This breaks one-hop back-edges
//! (a child pointing back at its parent's type) and nothing longer; deeper
//! cycles are cut off by [`MAX_DEPTH`].

use crate::state::{FieldNormalization, NormalizationRecord, NormalizedState};
use crate::{CoreError, CoreResult, Validator};
use protonorm_model::{DynamicMessage, MessageDescriptor, Value};
use protonorm_types::{Id, TypeKey};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Deepest chain of nested reattachments before giving up.
pub const MAX_DEPTH: usize = 128;

/// Outcome of a denormalize call.
#[derive(Debug, Clone, PartialEq)]
pub enum Denormalized<T> {
    /// Rebuilt and, if a validator was given, accepted.
    Found(T),
    /// Rebuilt but rejected by the validator.
    Rejected,
    /// The root type or id is not in the entities table.
    Missing,
}

impl<T> Denormalized<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Rebuilds the entity of type `root` stored under `key`.
///
/// The validator runs once, on the fully reattached root. Nested children are
/// not validated independently.
pub fn denormalize(
    key: &Id,
    root: &MessageDescriptor,
    state: &NormalizedState,
    validator: Option<&dyn Validator>,
) -> CoreResult<Denormalized<DynamicMessage>> {
    let entity_key = root.type_key();
    let Some(bucket) = state.entities.get(entity_key) else {
        return Ok(Denormalized::Missing);
    };
    let Some(stored) = bucket.get(key) else {
        return Ok(Denormalized::Missing);
    };

    let rebuilt = rebuild(stored, key, None, state, 0)?;
    if validator.is_some_and(|v| !v.validate(&rebuilt, entity_key, key)) {
        debug!("Denormalized entity {} (type={}) rejected", key, entity_key);
        return Ok(Denormalized::Rejected);
    }
    Ok(Denormalized::Found(rebuilt))
}

/// Rebuilds several entities of type `root`, in `keys` order.
///
/// Ids absent from the table are skipped. If any rebuilt entity fails
/// validation the whole call is [`Denormalized::Rejected`]; remaining ids are
/// not visited.
pub fn denormalize_many(
    keys: &[Id],
    root: &MessageDescriptor,
    state: &NormalizedState,
    validator: Option<&dyn Validator>,
) -> CoreResult<Denormalized<Vec<DynamicMessage>>> {
    if !state.entities.contains_key(root.type_key()) {
        return Ok(Denormalized::Missing);
    }

    let mut rebuilt = Vec::with_capacity(keys.len());
    for key in keys {
        match denormalize(key, root, state, validator)? {
            Denormalized::Found(message) => rebuilt.push(message),
            Denormalized::Rejected => return Ok(Denormalized::Rejected),
            Denormalized::Missing => {}
        }
    }
    Ok(Denormalized::Found(rebuilt))
}

/// Looks up the recorded reference(s) for `field` on the entity of type
/// `root` stored under `key`, without rebuilding anything.
pub fn get_normalizations<'s>(
    field: &str,
    key: &Id,
    root: &MessageDescriptor,
    state: &'s NormalizedState,
) -> Option<&'s FieldNormalization> {
    state
        .record(root.type_key(), key)
        .and_then(|record| record.get(field))
}

/// Reattaches the children listed in `record` onto `message` in place.
///
/// Used for roots that were normalized by value (no identity), whose record
/// is returned in [`NormalizedValue::Message`](crate::NormalizedValue).
pub fn reattach(
    message: &mut DynamicMessage,
    record: &NormalizationRecord,
    state: &NormalizedState,
) -> CoreResult<()> {
    attach_children(message, record, None, state, 0)
}

fn rebuild(
    stored: &DynamicMessage,
    key: &Id,
    parent: Option<&TypeKey>,
    state: &NormalizedState,
    depth: usize,
) -> CoreResult<DynamicMessage> {
    if depth > MAX_DEPTH {
        return Err(CoreError::DepthExceeded(MAX_DEPTH));
    }
    let mut copy = stored.clone();
    if let Some(record) = state.record(stored.descriptor().type_key(), key) {
        attach_children(&mut copy, record, parent, state, depth)?;
    }
    Ok(copy)
}

fn attach_children(
    message: &mut DynamicMessage,
    record: &NormalizationRecord,
    parent: Option<&TypeKey>,
    state: &NormalizedState,
    depth: usize,
) -> CoreResult<()> {
    let descriptor = message.descriptor().clone();
    let own_key = descriptor.type_key();

    for (name, normalization) in record {
        let field = descriptor.field(name).ok_or_else(|| CoreError::UnknownField {
            message: descriptor.full_name().to_string(),
            field: name.clone(),
        })?;
        let child_type = field
            .message_type()
            .ok_or_else(|| CoreError::NotAMessageField {
                message: descriptor.full_name().to_string(),
                field: name.clone(),
            })?;
        let child_key = child_type.type_key();
        if parent == Some(child_key) {
            trace!("Skipping back-edge {}.{} -> {}", own_key, name, child_key);
            continue;
        }
        let bucket = state
            .entities
            .get(child_key)
            .ok_or_else(|| CoreError::MissingTypeBucket(child_key.clone()))?;

        let value = match normalization {
            FieldNormalization::Many(ids) => {
                let mut children = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(child) = rebuild_child(bucket, id, own_key, state, depth)? {
                        children.push(Value::Message(child));
                    }
                }
                Value::List(children)
            }
            FieldNormalization::One(id) => rebuild_child(bucket, id, own_key, state, depth)?
                .map_or(Value::Null, Value::Message),
        };
        message.set(name, value)?;
    }
    Ok(())
}

fn rebuild_child(
    bucket: &BTreeMap<Id, DynamicMessage>,
    id: &Id,
    parent: &TypeKey,
    state: &NormalizedState,
    depth: usize,
) -> CoreResult<Option<DynamicMessage>> {
    match bucket.get(id) {
        Some(stored) => rebuild(stored, id, Some(parent), state, depth + 1).map(Some),
        None => {
            warn!("Recorded child {} missing from entities of its type", id);
            Ok(None)
        }
    }
}
