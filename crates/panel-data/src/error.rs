//! Error types for the data manager

use crate::persistence::Operation;
use panel_entity::{EntityId, EntityKind};
use panel_resource::LoadError;

/// Data manager error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// Accessed before initialization completed
    #[error("data manager is not initialized")]
    NotInitialized,

    /// No record with this id
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// Persistence refused a mutation; the local change was rolled back
    #[error("persistence rejected {operation} of {kind} {id}: {reason}")]
    Rejected {
        kind: EntityKind,
        id: EntityId,
        operation: Operation,
        reason: String,
    },

    /// A schedule would reference KPI or machine ids that do not exist
    #[error("schedule {schedule} references unknown {kind} ids {missing:?}")]
    DanglingReference {
        schedule: EntityId,
        kind: EntityKind,
        missing: Vec<EntityId>,
    },

    /// A KPI or machine is still referenced by schedules
    #[error("{kind} {id} is still referenced by schedules {schedules:?}")]
    StillReferenced {
        kind: EntityKind,
        id: EntityId,
        schedules: Vec<EntityId>,
    },

    /// No collection could be loaded
    #[error("initialization failed: {}", summarize(.errors))]
    InitializationFailed { errors: Vec<LoadError> },

    /// A global instance is already installed
    #[error("a global data manager is already installed")]
    AlreadyInstalled,

    /// No global instance installed yet
    #[error("no global data manager installed")]
    NotInstalled,

    /// Every id of a collection is taken
    #[error("{kind} id space exhausted")]
    IdsExhausted { kind: EntityKind },

    /// A record could not be serialized for persistence
    #[error("cannot encode {kind} {id}: {message}")]
    Encoding {
        kind: EntityKind,
        id: EntityId,
        message: String,
    },
}

fn summarize(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DataError {
    /// Create not-found error
    #[inline]
    #[must_use]
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    /// Whether the error means a mutation was refused before touching the cache
    #[must_use]
    pub fn is_reference_violation(&self) -> bool {
        matches!(
            self,
            Self::DanglingReference { .. } | Self::StillReferenced { .. }
        )
    }
}

/// Result type alias for data manager operations
pub type DataResult<T> = Result<T, DataError>;
