//! Optimistic mutations
//!
//! A mutation is applied to the cache first and persisted second. When
//! persistence rejects it, a compensating change is applied to the current
//! snapshot. Interleaved mutations are left intact: other records are never
//! touched, and a rolled-back update only reverts the fields it changed that
//! nothing has overwritten since.

use crate::error::DataError;
use crate::manager::DataManager;
use crate::persistence::{Operation, PersistRequest};
use crate::store::position;
use crate::stored::Stored;
use panel_entity::EntityId;
use serde_json::Value;

/// How to undo a locally applied mutation
#[derive(Debug, Clone)]
pub(crate) enum Undo<E> {
    /// Drop the created record
    Remove(EntityId),
    /// Put the previous version back
    Restore(E),
    /// Re-insert the deleted record at its old position
    Reinsert { index: usize, record: E },
}

/// A mutation applied to the cache, awaiting persistence
///
/// Dropping it keeps the local change without persisting it.
#[derive(Debug)]
#[must_use = "a pending mutation should be committed or rolled back"]
pub struct PendingMutation<E: Stored> {
    manager: DataManager,
    operation: Operation,
    record: E,
    undo: Undo<E>,
}

impl<E: Stored> PendingMutation<E> {
    pub(crate) fn new(manager: DataManager, operation: Operation, record: E, undo: Undo<E>) -> Self {
        Self {
            manager,
            operation,
            record,
            undo,
        }
    }

    /// Id of the affected record
    #[inline]
    pub fn id(&self) -> EntityId {
        self.record.id()
    }

    /// Kind of change
    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The created or updated record, or the deleted one
    #[inline]
    pub fn record(&self) -> &E {
        &self.record
    }

    /// Persist the change
    ///
    /// # Errors
    /// [`DataError::Rejected`] when persistence refuses the change, after the
    /// local change has been undone.
    pub async fn commit(self) -> Result<E, DataError> {
        let id = self.id();
        let entity = match serde_json::to_value(&self.record) {
            Ok(entity) => entity,
            Err(e) => {
                self.compensate();
                return Err(DataError::Encoding {
                    kind: E::KIND,
                    id,
                    message: e.to_string(),
                });
            }
        };

        let request = PersistRequest {
            kind: E::KIND,
            operation: self.operation,
            id,
            entity,
        };
        tracing::debug!(kind = %E::KIND, %id, operation = %self.operation, "persisting mutation");

        match self.manager.inner.persistence.persist(request).await {
            Ok(()) => Ok(self.record),
            Err(rejection) => {
                tracing::warn!(
                    kind = %E::KIND,
                    %id,
                    operation = %self.operation,
                    reason = %rejection,
                    "persistence rejected mutation, rolling back"
                );
                self.compensate();
                Err(DataError::Rejected {
                    kind: E::KIND,
                    id,
                    operation: self.operation,
                    reason: rejection.reason,
                })
            }
        }
    }

    /// Abandon the change locally without persisting it
    pub fn rollback(self) {
        self.compensate();
        tracing::debug!(kind = %E::KIND, id = %self.id(), operation = %self.operation, "mutation rolled back");
    }

    fn compensate(&self) {
        let _gate = self.manager.inner.mutation_gate.lock();
        let mut records = E::collection(&self.manager).write();

        match &self.undo {
            Undo::Remove(id) => {
                if let Some(index) = position(&records, *id) {
                    records.remove(index);
                }
            }
            Undo::Restore(previous) => match position(&records, previous.id()) {
                Some(index) if records[index] == self.record => records[index] = previous.clone(),
                Some(index) => match revert_fields(&records[index], &self.record, previous) {
                    Some(reverted) => records[index] = reverted,
                    None => tracing::warn!(
                        kind = %E::KIND,
                        id = %previous.id(),
                        "record changed since update, rollback skipped"
                    ),
                },
                None => tracing::warn!(
                    kind = %E::KIND,
                    id = %previous.id(),
                    "record deleted before rollback, previous version not restored"
                ),
            },
            Undo::Reinsert { index, record } => {
                if position(&records, record.id()).is_none() {
                    let at = (*index).min(records.len());
                    records.insert(at, record.clone());
                }
            }
        }
    }
}

/// Undo the fields `applied` changed relative to `previous`
///
/// A field is put back only while `current` still holds the applied value,
/// so later changes to the same record survive. `None` when the records do
/// not serialize to objects or the result no longer decodes.
fn revert_fields<E: Stored>(current: &E, applied: &E, previous: &E) -> Option<E> {
    let to_object = |record: &E| match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    };
    let mut fields = to_object(current)?;
    let applied = to_object(applied)?;
    let previous = to_object(previous)?;

    let keys: Vec<&String> = applied.keys().chain(previous.keys()).collect();
    for key in keys {
        let before = previous.get(key).unwrap_or(&Value::Null);
        let after = applied.get(key).unwrap_or(&Value::Null);
        if before == after || fields.get(key).unwrap_or(&Value::Null) != after {
            continue;
        }
        match previous.get(key) {
            Some(value) => fields.insert(key.clone(), value.clone()),
            None => fields.remove(key),
        };
    }

    E::decode(&Value::Object(fields)).ok()
}
