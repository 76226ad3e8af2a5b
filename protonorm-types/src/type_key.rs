//! Entity type keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercased fully-qualified message type name, used to bucket entities
/// and normalization records by type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Builds the key for a fully-qualified type name (e.g. `sample.Profile`
    /// becomes `sample.profile`). A leading `.` is stripped.
    pub fn from_type_name(name: &str) -> crate::Result<Self> {
        let trimmed = name.trim().trim_start_matches('.');
        if trimmed.is_empty() || trimmed.split('.').any(str::is_empty) {
            return Err(crate::Error::InvalidTypeName(name.to_string()));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path segment (the unqualified type name).
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
