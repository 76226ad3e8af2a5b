use crate::{ModelError, ModelResult};
use protonorm_types::TypeKey;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// The data type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    String,
}

impl ScalarType {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

/// What a field holds: a scalar, or a nested message of a named type.
///
/// JSON form is externally tagged: `{"scalar": "int"}` or
/// `{"message": "sample.Address"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar(ScalarType),
    Message(String),
}

/// A declared field of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub repeated: bool,
}

impl FieldSchema {
    /// Shorthand for a singular scalar field.
    pub fn scalar(name: &str, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(scalar),
            repeated: false,
        }
    }

    /// Shorthand for a repeated scalar field.
    pub fn repeated_scalar(name: &str, scalar: ScalarType) -> Self {
        Self {
            repeated: true,
            ..Self::scalar(name, scalar)
        }
    }

    /// Shorthand for a singular nested message field.
    pub fn message(name: &str, type_name: &str) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Message(type_name.into()),
            repeated: false,
        }
    }

    /// Shorthand for a repeated nested message field.
    pub fn repeated_message(name: &str, type_name: &str) -> Self {
        Self {
            repeated: true,
            ..Self::message(name, type_name)
        }
    }
}

/// Declares a message type: its fully-qualified name and fields in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl MessageSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaDocument {
    messages: Vec<MessageSchema>,
}

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageSchema>,
    type_keys: Vec<TypeKey>,
    by_name: HashMap<String, usize>,
    /// Per message, per field: index of the resolved nested message type.
    resolved: Vec<Vec<Option<usize>>>,
    /// Per message: field name -> field index.
    field_index: Vec<HashMap<String, usize>>,
}

/// A validated, shared registry of message types.
///
/// Cloning is cheap. Every nested type reference is resolved when the pool is
/// built, so descriptors handed out by the pool never dangle.
#[derive(Clone)]
pub struct SchemaPool {
    inner: Arc<PoolInner>,
}

impl SchemaPool {
    pub fn builder() -> SchemaPoolBuilder {
        SchemaPoolBuilder::default()
    }

    /// Loads a pool from a JSON schema document:
    /// `{"messages": [{"name": "...", "fields": [...]}]}`.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Self::from_schemas(doc.messages)
    }

    /// Serializes the pool back into its JSON schema document form.
    pub fn to_json(&self) -> ModelResult<String> {
        let doc = SchemaDocument {
            messages: self.inner.messages.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn from_schemas(messages: Vec<MessageSchema>) -> ModelResult<Self> {
        let mut by_name = HashMap::with_capacity(messages.len());
        let mut type_keys = Vec::with_capacity(messages.len());
        let mut seen = HashSet::with_capacity(messages.len());
        for (idx, message) in messages.iter().enumerate() {
            let name = normalize_name(&message.name);
            // Names differing only in case share an entities bucket.
            let type_key = TypeKey::from_type_name(name)?;
            if !seen.insert(type_key.clone()) {
                return Err(ModelError::DuplicateType(name.to_string()));
            }
            by_name.insert(name.to_string(), idx);
            type_keys.push(type_key);
        }

        let mut resolved = Vec::with_capacity(messages.len());
        let mut field_index = Vec::with_capacity(messages.len());
        for message in &messages {
            let mut names = HashMap::with_capacity(message.fields.len());
            let mut targets = Vec::with_capacity(message.fields.len());
            for (idx, field) in message.fields.iter().enumerate() {
                if names.insert(field.name.clone(), idx).is_some() {
                    return Err(ModelError::DuplicateField {
                        message: message.name.clone(),
                        field: field.name.clone(),
                    });
                }
                let target = match &field.kind {
                    FieldKind::Scalar(_) => None,
                    FieldKind::Message(type_name) => Some(
                        *by_name
                            .get(normalize_name(type_name))
                            .ok_or_else(|| ModelError::UnknownType(type_name.clone()))?,
                    ),
                };
                targets.push(target);
            }
            resolved.push(targets);
            field_index.push(names);
        }

        Ok(Self {
            inner: Arc::new(PoolInner {
                messages,
                type_keys,
                by_name,
                resolved,
                field_index,
            }),
        })
    }

    /// Looks up a message type by fully-qualified name.
    pub fn get(&self, name: &str) -> Option<MessageDescriptor> {
        self.inner
            .by_name
            .get(normalize_name(name))
            .map(|&index| MessageDescriptor {
                pool: self.clone(),
                index,
            })
    }

    /// Like [`get`](Self::get), but reports an unknown type as an error.
    pub fn descriptor(&self, name: &str) -> ModelResult<MessageDescriptor> {
        self.get(name)
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }

    /// Iterates all message types in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }
}

impl fmt::Debug for SchemaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaPool")
            .field("messages", &self.inner.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize_name(name: &str) -> &str {
    name.trim().trim_start_matches('.')
}

/// Collects message schemas before validating them into a [`SchemaPool`].
#[derive(Debug, Default)]
pub struct SchemaPoolBuilder {
    messages: Vec<MessageSchema>,
}

impl SchemaPoolBuilder {
    #[must_use]
    pub fn message(mut self, message: MessageSchema) -> Self {
        self.messages.push(message);
        self
    }

    /// Validates names and resolves all nested type references.
    pub fn build(self) -> ModelResult<SchemaPool> {
        SchemaPool::from_schemas(self.messages)
    }
}

/// Handle to a message type inside a [`SchemaPool`].
#[derive(Clone)]
pub struct MessageDescriptor {
    pool: SchemaPool,
    index: usize,
}

impl MessageDescriptor {
    fn schema(&self) -> &MessageSchema {
        &self.pool.inner.messages[self.index]
    }

    /// Fully-qualified type name as declared.
    pub fn full_name(&self) -> &str {
        normalize_name(&self.schema().name)
    }

    /// Lowercased fully-qualified name used to bucket entities of this type.
    pub fn type_key(&self) -> &TypeKey {
        &self.pool.inner.type_keys[self.index]
    }

    pub fn pool(&self) -> &SchemaPool {
        &self.pool
    }

    /// Declared fields in stable declaration order.
    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        (0..self.schema().fields.len()).map(move |index| FieldDescriptor {
            message: self.clone(),
            index,
        })
    }

    pub fn field(&self, name: &str) -> Option<FieldDescriptor> {
        self.pool.inner.field_index[self.index]
            .get(name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// True when the type declares an `id` field, making its instances
    /// candidates for entity extraction.
    pub fn has_id_field(&self) -> bool {
        self.field("id").is_some()
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pool.inner, &other.pool.inner) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

/// Handle to a declared field of a message type.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn schema(&self) -> &FieldSchema {
        &self.message.schema().fields[self.index]
    }

    pub fn name(&self) -> &str {
        &self.schema().name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.schema().kind
    }

    pub fn is_repeated(&self) -> bool {
        self.schema().repeated
    }

    /// The message type that declares this field.
    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Resolved nested message type, or `None` for scalar fields.
    pub fn message_type(&self) -> Option<MessageDescriptor> {
        self.message.pool.inner.resolved[self.message.index][self.index].map(|index| {
            MessageDescriptor {
                pool: self.message.pool.clone(),
                index,
            }
        })
    }

    pub(crate) fn expected_name(&self) -> String {
        let inner = match self.kind() {
            FieldKind::Scalar(scalar) => scalar.name().to_string(),
            FieldKind::Message(name) => name.clone(),
        };
        if self.is_repeated() {
            format!("repeated {inner}")
        } else {
            inner
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldDescriptor({}.{})", self.message.full_name(), self.name())
    }
}
