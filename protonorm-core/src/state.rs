//! Flat entity and normalization tables.

use crate::EntityMerger;
use protonorm_model::DynamicMessage;
use protonorm_types::{Id, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The child id(s) extracted from one field of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldNormalization {
    /// A singular message field.
    One(Id),
    /// A repeated message field, ids in field order.
    Many(Vec<Id>),
}

impl FieldNormalization {
    /// All referenced ids in order.
    pub fn ids(&self) -> &[Id] {
        match self {
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }
}

/// Field name -> extracted child reference(s) for one stored entity.
pub type NormalizationRecord = BTreeMap<String, FieldNormalization>;

/// The two flat tables produced by normalization.
///
/// `entities` holds at most one instance per (type, id); each stored instance
/// has its extracted fields cleared. `normalizations` lists exactly those
/// cleared fields and the ids they referenced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedState {
    pub entities: BTreeMap<TypeKey, BTreeMap<Id, DynamicMessage>>,
    pub normalizations: BTreeMap<TypeKey, BTreeMap<Id, NormalizationRecord>>,
}

impl NormalizedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored (flat) entity at (type, id).
    pub fn entity(&self, entity_key: &TypeKey, id: &Id) -> Option<&DynamicMessage> {
        self.entities.get(entity_key).and_then(|bucket| bucket.get(id))
    }

    /// The normalization record for the entity at (type, id).
    pub fn record(&self, entity_key: &TypeKey, id: &Id) -> Option<&NormalizationRecord> {
        self.normalizations
            .get(entity_key)
            .and_then(|bucket| bucket.get(id))
    }

    /// Number of stored entities across all types.
    pub fn entity_count(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Stores an entity, combining it with any existing one through `merger`.
    pub(crate) fn stage(
        &mut self,
        entity_key: TypeKey,
        id: Id,
        incoming: DynamicMessage,
        merger: &dyn EntityMerger,
    ) {
        let bucket = self.entities.entry(entity_key).or_default();
        let stored = match bucket.remove(&id) {
            Some(existing) => {
                debug!("Merging entity {} into existing instance", id);
                merger.merge(&existing, incoming)
            }
            None => incoming,
        };
        bucket.insert(id, stored);
    }

    /// Records extracted fields for (type, id). Fields already recorded are
    /// replaced; other fields on the record are kept.
    pub(crate) fn record_fields(
        &mut self,
        entity_key: TypeKey,
        id: Id,
        fields: NormalizationRecord,
    ) {
        if fields.is_empty() {
            return;
        }
        self.normalizations
            .entry(entity_key)
            .or_default()
            .entry(id)
            .or_default()
            .extend(fields);
    }

    /// Folds the tables of a later normalize call into this state. Entities
    /// present in both are combined with `merger`; normalization records are
    /// merged field by field with `other` winning.
    pub fn absorb(&mut self, other: NormalizedState, merger: &dyn EntityMerger) {
        for (entity_key, bucket) in other.entities {
            for (id, entity) in bucket {
                self.stage(entity_key.clone(), id, entity, merger);
            }
        }
        for (entity_key, bucket) in other.normalizations {
            for (id, fields) in bucket {
                self.record_fields(entity_key.clone(), id, fields);
            }
        }
    }

    /// JSON view of both tables, for embedding in application state.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
