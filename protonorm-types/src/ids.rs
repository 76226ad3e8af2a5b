//! Entity identifiers.
//!
//! Ids are either integers or strings, whichever the message's `id` field
//! carries. Table lookups coerce both to their string form, so `1` and `"1"`
//! address the same slot.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Identity value of an entity within its type bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl Id {
    /// Generates a fresh string key (UUID v7) for roots with no natural id,
    /// such as query responses.
    #[must_use]
    pub fn generate() -> Self {
        Self::Str(Uuid::now_v7().to_string())
    }

    /// Returns the string form used for table comparisons.
    #[must_use]
    pub fn as_key(&self) -> String {
        self.to_string()
    }

    /// Returns the integer value if this id is numeric.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    /// Returns the string value if this id is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }

    /// Integer value of the key, if its string form is a canonical integer
    /// (no sign other than a leading `-`, no leading zeros, no `-0`).
    fn numeric_key(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(s) => canonical_int(s),
        }
    }

    /// Reads an id out of a JSON value. Only integers and strings qualify.
    pub fn from_json(value: &serde_json::Value) -> crate::Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Self::Str(s.clone())),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .ok_or_else(|| crate::Error::InvalidId(n.to_string())),
            other => Err(crate::Error::InvalidId(other.to_string())),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(v), Self::Str(s)) | (Self::Str(s), Self::Int(v)) => {
                canonical_int(s) == Some(*v)
            }
        }
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.numeric_key() {
            Some(v) => v.hash(state),
            None => self.to_string().hash(state),
        }
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    /// Canonical integers sort numerically ahead of all other keys, which
    /// sort lexically. Agrees with `Eq`: `Str("7")` and `Int(7)` are equal.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_key(), other.numeric_key()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            // Only non-numeric strings reach here.
            (None, None) => match (self, other) {
                (Self::Str(a), Self::Str(b)) => a.cmp(b),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let canonical = match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == s.len(),
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    };
    if canonical { s.parse().ok() } else { None }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Id {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Self::Str(value.to_string())
    }
}
