//! Panel Entities
//!
//! Typed domain records of the factory panel and the decoder protocol that
//! turns untyped JSON into them.
//!
//! # Core Concepts
//!
//! - [`EntityId`]: Stable integer identity, unique within one collection
//! - [`Decodable`]: Per-type `raw JSON -> entity | DecodeError` contract
//! - [`Entity`]: Decodable records with patch/merge semantics and creation defaults
//! - [`Schedule`], [`Kpi`], [`Machine`]: The concrete collections
//!
//! # Example
//!
//! ```rust,ignore
//! use panel_entity::{Decodable, Schedule};
//!
//! let raw = serde_json::json!({
//!     "id": 1, "name": "Weekly OEE", "recurrence": "Weekly", "status": "Active",
//!     "email": "ops@example.com", "startDate": "2024-11-04",
//!     "kpis": [1, 2], "machines": [3]
//! });
//! let schedule = Schedule::decode(&raw)?;
//! assert_eq!(schedule.kpis.len(), 2);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod decode;
mod entity;
mod id;
mod kpi;
mod machine;
mod schedule;

// Re-exports
pub use decode::{Decodable, DecodeError, FieldReader, Violation, DATE_FORMAT, RECORD_FIELD};
pub use entity::Entity;
pub use id::{EntityId, EntityKind};
pub use kpi::{Kpi, KpiPatch, DEFAULT_KPI_NAME, DEFAULT_KPI_UNIT};
pub use machine::{Machine, MachinePatch, DEFAULT_MACHINE_NAME, DEFAULT_MACHINE_TYPE};
pub use schedule::{Recurrence, Schedule, SchedulePatch, ScheduleStatus, DEFAULT_SCHEDULE_NAME};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn created_schedule_survives_serialize_then_decode() {
        let today = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let created = Schedule::from_patch(EntityId::new(7), SchedulePatch::default(), today);

        let raw = serde_json::to_value(&created).unwrap();
        let decoded = Schedule::decode(&raw).unwrap();

        assert_eq!(decoded, created);
    }

    #[test]
    fn every_kind_decodes_from_its_serialized_form() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let kpi = Kpi::from_patch(EntityId::new(1), KpiPatch::default(), today);
        let machine = Machine::from_patch(EntityId::new(2), MachinePatch::default(), today);

        assert_eq!(Kpi::decode(&serde_json::to_value(&kpi).unwrap()).unwrap(), kpi);
        assert_eq!(
            Machine::decode(&serde_json::to_value(&machine).unwrap()).unwrap(),
            machine
        );
    }
}
