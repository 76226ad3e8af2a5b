//! Reconciling a newly visited entity with one already stored under the same
//! type and id.

use protonorm_model::DynamicMessage;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Combines a stored entity with an incoming one for the same (type, id).
///
/// Implemented for any `Fn(&DynamicMessage, DynamicMessage) -> DynamicMessage`,
/// so a closure can be passed wherever a merger is expected.
pub trait EntityMerger {
    fn merge(&self, existing: &DynamicMessage, incoming: DynamicMessage) -> DynamicMessage;
}

impl<F> EntityMerger for F
where
    F: Fn(&DynamicMessage, DynamicMessage) -> DynamicMessage,
{
    fn merge(&self, existing: &DynamicMessage, incoming: DynamicMessage) -> DynamicMessage {
        self(existing, incoming)
    }
}

/// Built-in merge policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// The incoming entity replaces the stored one wholesale.
    #[default]
    LastWriteWins,
    /// Fields set on the incoming entity overwrite; fields it leaves unset
    /// keep their stored value.
    PerField,
}

impl EntityMerger for MergeStrategy {
    fn merge(&self, existing: &DynamicMessage, mut incoming: DynamicMessage) -> DynamicMessage {
        match self {
            Self::LastWriteWins => incoming,
            Self::PerField => {
                if existing.descriptor() != incoming.descriptor() {
                    return incoming;
                }
                let names: Vec<String> = incoming
                    .descriptor()
                    .fields()
                    .map(|f| f.name().to_string())
                    .collect();
                let mut merged = existing.clone();
                for name in names {
                    if let Some(value) = incoming.take(&name) {
                        if let Err(err) = merged.set(&name, value) {
                            warn!("Per-field merge dropped {}: {}", name, err);
                        }
                    }
                }
                merged
            }
        }
    }
}
