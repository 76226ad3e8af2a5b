use crate::{FieldDescriptor, FieldKind, MessageDescriptor, ModelError, ModelResult, ScalarType, Value};
use crate::value::float_from_json;
use protonorm_types::Id;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A message instance whose shape is described at runtime by a
/// [`MessageDescriptor`].
///
/// Only set fields are stored. Field values are type-checked against the
/// descriptor on every [`set`](Self::set).
#[derive(Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<String, Value>,
}

impl DynamicMessage {
    /// Creates an empty message of the given type.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Returns the field's value, or `None` when the field is unset.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field by name. `Null` or an empty list clears it.
    pub fn set(&mut self, name: &str, value: Value) -> ModelResult<()> {
        let field = self.field_descriptor(name)?;
        if value.is_null() || matches!(&value, Value::List(items) if items.is_empty()) {
            self.fields.remove(name);
            return Ok(());
        }
        check_field_value(&field, &value)?;
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> ModelResult<Self> {
        self.set(name, value.into())?;
        Ok(self)
    }

    /// Clears a field, returning its previous value.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// The message's own identity: the `id` field, if set to an integer or
    /// string.
    pub fn id(&self) -> Option<Id> {
        self.get("id").and_then(Value::as_id)
    }

    /// Iterates set fields in declaration order.
    pub fn set_fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.descriptor
            .fields()
            .filter_map(move |field| self.fields.get(field.name()).map(|value| (field, value)))
    }

    /// Encodes the message into its byte form.
    pub fn encode(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_json())?)
    }

    /// Decodes a message of the given type from its byte form. The result
    /// shares no state with whatever produced the bytes.
    pub fn decode(descriptor: &MessageDescriptor, bytes: &[u8]) -> ModelResult<Self> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_json(descriptor, &json)
    }

    /// JSON object of the set fields, nested messages inlined.
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .set_fields()
            .map(|(field, value)| (field.name().to_string(), value.to_json()))
            .collect();
        serde_json::Value::Object(object)
    }

    /// Builds a message from a JSON object, resolving nested message types
    /// through the descriptor. Unknown keys are rejected; `null` is skipped.
    pub fn from_json(descriptor: &MessageDescriptor, json: &serde_json::Value) -> ModelResult<Self> {
        let object = json.as_object().ok_or_else(|| ModelError::TypeMismatch {
            field: descriptor.full_name().to_string(),
            expected: "object".into(),
            found: json_kind(json).into(),
        })?;

        let mut message = Self::new(descriptor.clone());
        for (name, raw) in object {
            let field = message.field_descriptor(name)?;
            if raw.is_null() {
                continue;
            }
            let value = if field.is_repeated() {
                let items = raw.as_array().ok_or_else(|| ModelError::TypeMismatch {
                    field: name.clone(),
                    expected: field.expected_name(),
                    found: json_kind(raw).into(),
                })?;
                Value::List(
                    items
                        .iter()
                        .map(|item| value_from_json(&field, item))
                        .collect::<ModelResult<_>>()?,
                )
            } else {
                value_from_json(&field, raw)?
            };
            message.set(name, value)?;
        }
        Ok(message)
    }

    fn field_descriptor(&self, name: &str) -> ModelResult<FieldDescriptor> {
        self.descriptor
            .field(name)
            .ok_or_else(|| ModelError::UnknownField {
                message: self.descriptor.full_name().to_string(),
                field: name.to_string(),
            })
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor.full_name());
        for (field, value) in self.set_fields() {
            s.field(field.name(), value);
        }
        s.finish()
    }
}

impl Serialize for DynamicMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn check_field_value(field: &FieldDescriptor, value: &Value) -> ModelResult<()> {
    let mismatch = |found: &Value| ModelError::TypeMismatch {
        field: field.name().to_string(),
        expected: field.expected_name(),
        found: found.kind_name(),
    };
    match (field.is_repeated(), value) {
        (true, Value::List(items)) => {
            for item in items {
                if !element_fits(field, item) {
                    return Err(mismatch(item));
                }
            }
            Ok(())
        }
        (false, v) if !matches!(v, Value::List(_)) && element_fits(field, v) => Ok(()),
        (_, v) => Err(mismatch(v)),
    }
}

fn element_fits(field: &FieldDescriptor, value: &Value) -> bool {
    match (field.kind(), value) {
        (FieldKind::Scalar(ScalarType::Bool), Value::Bool(_))
        | (FieldKind::Scalar(ScalarType::Int), Value::Int(_))
        | (FieldKind::Scalar(ScalarType::Float), Value::Float(_))
        | (FieldKind::Scalar(ScalarType::String), Value::String(_)) => true,
        (FieldKind::Message(_), Value::Message(m)) => {
            field.message_type().as_ref() == Some(m.descriptor())
        }
        _ => false,
    }
}

fn value_from_json(field: &FieldDescriptor, raw: &serde_json::Value) -> ModelResult<Value> {
    let mismatch = || ModelError::TypeMismatch {
        field: field.name().to_string(),
        expected: field.expected_name(),
        found: json_kind(raw).into(),
    };
    match field.kind() {
        FieldKind::Scalar(ScalarType::Bool) => raw.as_bool().map(Value::Bool).ok_or_else(mismatch),
        FieldKind::Scalar(ScalarType::Int) => raw.as_i64().map(Value::Int).ok_or_else(mismatch),
        FieldKind::Scalar(ScalarType::Float) => {
            float_from_json(raw).map(Value::Float).ok_or_else(mismatch)
        }
        FieldKind::Scalar(ScalarType::String) => raw
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::Message(name) => {
            let nested = field
                .message_type()
                .ok_or_else(|| ModelError::UnknownType(name.clone()))?;
            Ok(Value::Message(DynamicMessage::from_json(&nested, raw)?))
        }
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
