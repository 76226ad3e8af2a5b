//! Entity identity and node classification shared by both passes.

use protonorm_model::{DynamicMessage, Value};
use protonorm_types::Id;

/// What a visited value is, decided once per node.
pub(crate) enum Shape {
    /// A message with an identity: extracted into the entities table.
    Entity { message: DynamicMessage, id: Id },
    /// A message without identity, kept by value.
    ValueMessage(DynamicMessage),
    /// An ordered sequence, visited element by element.
    Sequence(Vec<Value>),
    /// Anything else, returned unchanged.
    Scalar(Value),
}

impl Shape {
    /// Classifies `value`. A supplied `key` makes any message an entity under
    /// that key; otherwise a message is an entity when its type declares an
    /// `id` field and the instance carries a non-null id.
    pub(crate) fn classify(value: Value, key: Option<Id>) -> Self {
        match value {
            Value::Message(message) => match key.or_else(|| entity_id(&message)) {
                Some(id) => Self::Entity { message, id },
                None => Self::ValueMessage(message),
            },
            Value::List(items) => Self::Sequence(items),
            other => Self::Scalar(other),
        }
    }
}

/// The message's own identity, if it has one.
pub(crate) fn entity_id(message: &DynamicMessage) -> Option<Id> {
    if !message.descriptor().has_id_field() {
        return None;
    }
    message.id()
}

/// True when `value` is a message with its own identity.
pub(crate) fn is_entity(value: &Value) -> bool {
    value.as_message().and_then(entity_id).is_some()
}
