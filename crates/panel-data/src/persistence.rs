//! Persistence collaborator
//!
//! Mutations are applied to the cache first and persisted afterwards. The
//! collaborator either accepts a request or rejects it with a reason, in
//! which case the data manager compensates locally.

use async_trait::async_trait;
use panel_entity::{EntityId, EntityKind};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Kind of change being persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// New record
    Create,
    /// Changed record
    Update,
    /// Removed record
    Delete,
}

impl Operation {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change to persist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistRequest {
    /// Collection the record belongs to
    pub kind: EntityKind,
    /// What happened to it
    pub operation: Operation,
    /// Record id
    pub id: EntityId,
    /// Serialized record (the removed record for deletes)
    pub entity: Value,
}

/// Refusal from the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejection {
    /// Human-readable reason
    pub reason: String,
}

impl Rejection {
    /// Create rejection with reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Persists locally applied mutations
#[async_trait]
pub trait Persistence: Send + Sync + 'static {
    /// Persist one change
    ///
    /// # Errors
    /// [`Rejection`] when the change must be undone locally.
    async fn persist(&self, request: PersistRequest) -> Result<(), Rejection>;
}

#[async_trait]
impl<P> Persistence for std::sync::Arc<P>
where
    P: Persistence + ?Sized,
{
    async fn persist(&self, request: PersistRequest) -> Result<(), Rejection> {
        (**self).persist(request).await
    }
}

/// Accepts every change without storing it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

#[async_trait]
impl Persistence for NoopPersistence {
    async fn persist(&self, request: PersistRequest) -> Result<(), Rejection> {
        tracing::debug!(
            kind = %request.kind,
            id = %request.id,
            operation = %request.operation,
            "no persistence configured, accepting change"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_accepts_everything() {
        let request = PersistRequest {
            kind: EntityKind::Schedule,
            operation: Operation::Delete,
            id: EntityId::new(3),
            entity: Value::Null,
        };
        assert!(NoopPersistence.persist(request).await.is_ok());
    }

    #[test]
    fn request_serializes_for_transport() {
        let request = PersistRequest {
            kind: EntityKind::Kpi,
            operation: Operation::Create,
            id: EntityId::new(12),
            entity: serde_json::json!({"id": 12}),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"kind": "kpi", "operation": "create", "id": 12, "entity": {"id": 12}})
        );
    }
}
