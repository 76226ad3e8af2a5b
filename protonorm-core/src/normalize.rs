//! Normalizer - flattens a message graph into entity and normalization tables.
//!
//! Traversal is depth-first over fields in declaration order. Every message
//! with an identity (its own `id`, or the key supplied for the root) is moved
//! into the entities table; each field that held such messages is cleared on
//! its parent and recorded as a reference to the child id(s).
//!
//! The input is consumed. Stored entities are the input messages themselves,
//! minus their extracted fields.

use crate::shape::{Shape, entity_id, is_entity};
use crate::state::{FieldNormalization, NormalizationRecord, NormalizedState};
use crate::{EntityMerger, MergeStrategy};
use protonorm_model::{DynamicMessage, Value};
use protonorm_types::Id;
use serde::Serialize;
use tracing::{debug, trace};

static LAST_WRITE_WINS: MergeStrategy = MergeStrategy::LastWriteWins;

/// What the caller uses to re-enter the tables after normalizing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    /// The input was an entity.
    Id(Id),
    /// The input was a sequence; one result per element, in order.
    Sequence(Vec<NormalizedValue>),
    /// The input was a message without identity. Its entity fields were
    /// extracted and are listed in `record`; see [`reattach`](crate::reattach).
    Message {
        message: DynamicMessage,
        record: NormalizationRecord,
    },
    /// The input was a scalar, returned unchanged.
    Scalar(Value),
}

impl NormalizedValue {
    pub const fn as_id(&self) -> Option<&Id> {
        match self {
            Self::Id(id) => Some(id),
            _ => None,
        }
    }

    /// The ids of a sequence result, if every element is an id.
    pub fn ids(&self) -> Option<Vec<Id>> {
        match self {
            Self::Sequence(items) => items.iter().map(|item| item.as_id().cloned()).collect(),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<(DynamicMessage, NormalizationRecord)> {
        match self {
            Self::Message { message, record } => Some((message, record)),
            _ => None,
        }
    }
}

/// Output of one normalize call: fresh tables plus the root result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    #[serde(flatten)]
    pub state: NormalizedState,
    pub result: NormalizedValue,
}

/// Configures and runs normalization.
///
/// ```ignore
/// let normalized = Normalizer::new().with_key("query-1").normalize(response);
/// ```
pub struct Normalizer<'m> {
    key: Option<Id>,
    merger: &'m dyn EntityMerger,
}

impl Default for Normalizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m> Normalizer<'m> {
    pub fn new() -> Self {
        Self {
            key: None,
            merger: &LAST_WRITE_WINS,
        }
    }

    /// Identity for the root message, overriding its own `id`. Makes a root
    /// with no natural id (e.g. a query response) an entity. Ignored when the
    /// root is a sequence.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Id>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Reconciles entities visited more than once under the same (type, id).
    /// Defaults to last-write-wins.
    #[must_use]
    pub fn with_merger(mut self, merger: &'m dyn EntityMerger) -> Self {
        self.merger = merger;
        self
    }

    /// Normalizes `input` into freshly constructed tables.
    pub fn normalize(&self, input: impl Into<Value>) -> Normalized {
        let mut visit = Visit {
            merger: self.merger,
            state: NormalizedState::new(),
        };
        let result = visit.value(input.into(), self.key.clone());
        Normalized {
            state: visit.state,
            result,
        }
    }
}

/// Normalizes `input` with last-write-wins merging. `key` overrides the root's
/// identity.
pub fn normalize(input: impl Into<Value>, key: Option<Id>) -> Normalized {
    match key {
        Some(key) => Normalizer::new().with_key(key).normalize(input),
        None => Normalizer::new().normalize(input),
    }
}

struct Visit<'m> {
    merger: &'m dyn EntityMerger,
    state: NormalizedState,
}

impl Visit<'_> {
    fn value(&mut self, value: Value, key: Option<Id>) -> NormalizedValue {
        match Shape::classify(value, key) {
            Shape::Sequence(items) => NormalizedValue::Sequence(
                items.into_iter().map(|item| self.value(item, None)).collect(),
            ),
            Shape::Entity { message, id } => NormalizedValue::Id(self.entity(message, id)),
            Shape::ValueMessage(mut message) => {
                let record = self.fields(&mut message);
                NormalizedValue::Message { message, record }
            }
            Shape::Scalar(value) => NormalizedValue::Scalar(value),
        }
    }

    fn entity(&mut self, mut message: DynamicMessage, id: Id) -> Id {
        let entity_key = message.descriptor().type_key().clone();
        debug!("Normalizing entity {} (type={})", id, entity_key);

        let record = self.fields(&mut message);
        self.state
            .record_fields(entity_key.clone(), id.clone(), record);
        self.state
            .stage(entity_key, id.clone(), message, self.merger);
        id
    }

    /// Extracts entity-valued fields from `message`, returning what was
    /// extracted. Singular fields qualify when the value is an entity;
    /// repeated fields when non-empty and every element is an entity.
    fn fields(&mut self, message: &mut DynamicMessage) -> NormalizationRecord {
        let candidates: Vec<(String, bool)> = message
            .set_fields()
            .filter(|(field, value)| {
                if field.is_repeated() {
                    value
                        .as_list()
                        .is_some_and(|items| !items.is_empty() && items.iter().all(is_entity))
                } else {
                    is_entity(value)
                }
            })
            .map(|(field, _)| (field.name().to_string(), field.is_repeated()))
            .collect();

        let mut record = NormalizationRecord::new();
        for (name, repeated) in candidates {
            let Some(value) = message.take(&name) else {
                continue;
            };
            let normalization = if repeated {
                let Value::List(items) = value else {
                    continue;
                };
                FieldNormalization::Many(
                    items
                        .into_iter()
                        .filter_map(Value::into_message)
                        .filter_map(|child| self.child(child))
                        .collect(),
                )
            } else {
                let Some(id) = value.into_message().and_then(|child| self.child(child)) else {
                    continue;
                };
                FieldNormalization::One(id)
            };
            trace!("Extracted {} -> {:?}", name, normalization);
            record.insert(name, normalization);
        }
        record
    }

    fn child(&mut self, child: DynamicMessage) -> Option<Id> {
        let id = entity_id(&child)?;
        Some(self.entity(child, id))
    }
}
