//! Schedule references to KPIs and machines
//!
//! References are plain ids. Whether a mutation may leave one dangling is
//! decided by [`ReferencePolicy`]; callers hold the mutation gate.

use crate::config::ReferencePolicy;
use crate::error::DataError;
use crate::manager::DataManager;
use im::Vector;
use panel_entity::{Entity, EntityId, EntityKind, Schedule};
use serde::Serialize;

/// A schedule reference to a record that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DanglingReference {
    /// Referencing schedule
    pub schedule: EntityId,
    /// Collection of the missing record
    pub kind: EntityKind,
    /// Missing id
    pub id: EntityId,
}

/// Ids in `wanted` that are neither in `known` nor in `already`
///
/// Each id is listed once, in first-seen order.
fn missing<E: Entity>(wanted: &[EntityId], known: &Vector<E>, already: &[EntityId]) -> Vec<EntityId> {
    let mut missing: Vec<EntityId> = Vec::new();
    for id in wanted {
        if missing.contains(id) || already.contains(id) || known.iter().any(|r| r.id() == *id) {
            continue;
        }
        missing.push(*id);
    }
    missing
}

/// Check the references a schedule create or update introduces
///
/// Ids the previous version already referenced are not re-checked.
pub(crate) fn check_schedule(
    manager: &DataManager,
    schedule: &Schedule,
    previous: Option<&Schedule>,
) -> Result<(), DataError> {
    let inner = &manager.inner;
    let kpis = missing(
        &schedule.kpis,
        &inner.kpis.read(),
        previous.map_or(&[][..], |p| p.kpis.as_slice()),
    );
    let machines = missing(
        &schedule.machines,
        &inner.machines.read(),
        previous.map_or(&[][..], |p| p.machines.as_slice()),
    );

    for (kind, missing) in [(EntityKind::Kpi, kpis), (EntityKind::Machine, machines)] {
        if missing.is_empty() {
            continue;
        }
        match inner.config.reference_policy {
            ReferencePolicy::Warn => {
                tracing::warn!(
                    schedule = %schedule.id,
                    %kind,
                    ?missing,
                    "schedule references unknown ids"
                );
            }
            ReferencePolicy::Reject => {
                return Err(DataError::DanglingReference {
                    schedule: schedule.id,
                    kind,
                    missing,
                });
            }
        }
    }
    Ok(())
}

/// Check whether removing a KPI or machine strands any schedule
pub(crate) fn check_removal(
    manager: &DataManager,
    kind: EntityKind,
    id: EntityId,
) -> Result<(), DataError> {
    let inner = &manager.inner;
    let schedules: Vec<EntityId> = inner
        .schedules
        .read()
        .iter()
        .filter(|s| match kind {
            EntityKind::Kpi => s.references_kpi(id),
            EntityKind::Machine => s.references_machine(id),
            EntityKind::Schedule => false,
        })
        .map(|s| s.id)
        .collect();

    if schedules.is_empty() {
        return Ok(());
    }
    match inner.config.reference_policy {
        ReferencePolicy::Warn => {
            tracing::warn!(%kind, %id, ?schedules, "removing record still referenced by schedules");
            Ok(())
        }
        ReferencePolicy::Reject => Err(DataError::StillReferenced {
            kind,
            id,
            schedules,
        }),
    }
}

impl DataManager {
    /// Every schedule reference to a KPI or machine that does not exist
    ///
    /// # Errors
    /// [`DataError::NotInitialized`] before `Ready`.
    pub fn dangling_references(&self) -> Result<Vec<DanglingReference>, DataError> {
        self.ensure_ready()?;
        // Consistent view across the three collections
        let _gate = self.inner.mutation_gate.lock();
        let kpis = self.inner.kpis.snapshot();
        let machines = self.inner.machines.snapshot();
        let schedules = self.inner.schedules.snapshot();

        let mut dangling = Vec::new();
        for schedule in &schedules {
            let kpi_refs = schedule.kpis.iter().map(|id| (EntityKind::Kpi, *id));
            let machine_refs = schedule.machines.iter().map(|id| (EntityKind::Machine, *id));

            for (kind, id) in kpi_refs.chain(machine_refs) {
                let exists = match kind {
                    EntityKind::Kpi => kpis.iter().any(|k| k.id == id),
                    _ => machines.iter().any(|m| m.id == id),
                };
                if !exists {
                    dangling.push(DanglingReference {
                        schedule: schedule.id,
                        kind,
                        id,
                    });
                }
            }
        }
        Ok(dangling)
    }
}
