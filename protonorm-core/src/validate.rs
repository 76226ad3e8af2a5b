//! Acceptance predicates for denormalized entities.

use protonorm_model::{DynamicMessage, Value};
use protonorm_types::{Id, TypeKey};

/// Decides whether a rebuilt entity is acceptable.
///
/// Implemented for any `Fn(&DynamicMessage, &TypeKey, &Id) -> bool`.
pub trait Validator {
    fn validate(&self, entity: &DynamicMessage, entity_key: &TypeKey, key: &Id) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&DynamicMessage, &TypeKey, &Id) -> bool,
{
    fn validate(&self, entity: &DynamicMessage, entity_key: &TypeKey, key: &Id) -> bool {
        self(entity, entity_key, key)
    }
}

/// Accepts an entity only if every dotted field path resolves to a set value.
///
/// Path components are field names; on a repeated field a numeric component
/// selects an element (`"admins.0.status.value"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    paths: Vec<Vec<String>>,
}

impl RequiredFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: fields
                .into_iter()
                .map(|field| field.as_ref().split('.').map(str::to_string).collect())
                .collect(),
        }
    }
}

impl Validator for RequiredFields {
    fn validate(&self, entity: &DynamicMessage, _entity_key: &TypeKey, _key: &Id) -> bool {
        self.paths.iter().all(|path| has_value(entity, path))
    }
}

fn has_value(entity: &DynamicMessage, path: &[String]) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return true;
    };
    let Some(mut current) = entity.get(first) else {
        return false;
    };
    for part in rest {
        let next = match current {
            Value::Message(message) => message.get(part),
            Value::List(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) if !value.is_null() => current = value,
            _ => return false,
        }
    }
    !current.is_null()
}

/// Validators applied left to right, stopping at the first rejection.
#[derive(Default)]
pub struct Combined<'a> {
    validators: Vec<Box<dyn Validator + 'a>>,
}

impl<'a> Combined<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validator to the chain.
    #[must_use]
    pub fn and(mut self, validator: impl Validator + 'a) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validator for Combined<'_> {
    fn validate(&self, entity: &DynamicMessage, entity_key: &TypeKey, key: &Id) -> bool {
        self.validators
            .iter()
            .all(|validator| validator.validate(entity, entity_key, key))
    }
}

/// Combines validators into one that accepts only if all accept. Later
/// validators are not called once one rejects.
pub fn combine<'a, I>(validators: I) -> Combined<'a>
where
    I: IntoIterator<Item = Box<dyn Validator + 'a>>,
{
    Combined {
        validators: validators.into_iter().collect(),
    }
}
