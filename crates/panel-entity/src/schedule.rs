//! Recurring report schedules
//!
//! A schedule mails a report covering a set of KPIs over a set of machines,
//! starting on a calendar date and repeating at a fixed recurrence.

use crate::decode::{Decodable, DecodeError, FieldReader};
use crate::entity::Entity;
use crate::id::{EntityId, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name given to schedules created without one
pub const DEFAULT_SCHEDULE_NAME: &str = "Unnamed Schedule";

/// How often a report is produced
///
/// Stored as free-form text; values outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recurrence {
    /// Every day
    #[default]
    Daily,
    /// Every week
    Weekly,
    /// Every month
    Monthly,
    /// Unrecognized value, preserved for round-trips
    Other(String),
}

impl Recurrence {
    /// Text form used in resource documents
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Other(text) => text,
        }
    }
}

impl From<String> for Recurrence {
    fn from(text: String) -> Self {
        match text.as_str() {
            "Daily" => Self::Daily,
            "Weekly" => Self::Weekly,
            "Monthly" => Self::Monthly,
            _ => Self::Other(text),
        }
    }
}

impl From<&str> for Recurrence {
    fn from(text: &str) -> Self {
        Self::from(text.to_owned())
    }
}

impl From<Recurrence> for String {
    fn from(recurrence: Recurrence) -> Self {
        match recurrence {
            Recurrence::Other(text) => text,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a schedule is currently producing reports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScheduleStatus {
    /// Producing reports
    #[default]
    Active,
    /// Temporarily stopped
    Paused,
    /// Unrecognized value, preserved for round-trips
    Other(String),
}

impl ScheduleStatus {
    /// Text form used in resource documents
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Other(text) => text,
        }
    }
}

impl From<String> for ScheduleStatus {
    fn from(text: String) -> Self {
        match text.as_str() {
            "Active" => Self::Active,
            "Paused" => Self::Paused,
            _ => Self::Other(text),
        }
    }
}

impl From<&str> for ScheduleStatus {
    fn from(text: &str) -> Self {
        Self::from(text.to_owned())
    }
}

impl From<ScheduleStatus> for String {
    fn from(status: ScheduleStatus) -> Self {
        match status {
            ScheduleStatus::Other(text) => text,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurring report schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: EntityId,
    pub name: String,
    pub recurrence: Recurrence,
    pub status: ScheduleStatus,
    /// Report recipient
    pub email: String,
    pub start_date: NaiveDate,
    /// Referenced KPI ids, display order preserved
    pub kpis: Vec<EntityId>,
    /// Referenced machine ids, display order preserved
    pub machines: Vec<EntityId>,
}

impl Schedule {
    /// Whether the schedule references the given KPI
    #[inline]
    #[must_use]
    pub fn references_kpi(&self, id: EntityId) -> bool {
        self.kpis.contains(&id)
    }

    /// Whether the schedule references the given machine
    #[inline]
    #[must_use]
    pub fn references_machine(&self, id: EntityId) -> bool {
        self.machines.contains(&id)
    }
}

impl Decodable for Schedule {
    fn decode(raw: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(EntityKind::Schedule, raw)?;

        Ok(Self {
            id: fields.id("id")?,
            name: fields.string("name")?,
            recurrence: Recurrence::from(fields.string("recurrence")?),
            status: ScheduleStatus::from(fields.string("status")?),
            email: fields.string("email")?,
            start_date: fields.date("startDate")?,
            kpis: fields.id_list("kpis")?,
            machines: fields.id_list("machines")?,
        })
    }
}

/// Partial schedule fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulePatch {
    pub name: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub status: Option<ScheduleStatus>,
    pub email: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub kpis: Option<Vec<EntityId>>,
    pub machines: Option<Vec<EntityId>>,
}

impl SchedulePatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With recurrence
    #[inline]
    #[must_use]
    pub fn recurrence(mut self, recurrence: impl Into<Recurrence>) -> Self {
        self.recurrence = Some(recurrence.into());
        self
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn status(mut self, status: impl Into<ScheduleStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// With recipient email
    #[inline]
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With start date
    #[inline]
    #[must_use]
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// With KPI references
    #[inline]
    #[must_use]
    pub fn kpis(mut self, ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.kpis = Some(ids.into_iter().collect());
        self
    }

    /// With machine references
    #[inline]
    #[must_use]
    pub fn machines(mut self, ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.machines = Some(ids.into_iter().collect());
        self
    }
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;

    type Patch = SchedulePatch;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_patch(id: EntityId, patch: SchedulePatch, today: NaiveDate) -> Self {
        Self {
            id,
            name: patch.name.unwrap_or_else(|| DEFAULT_SCHEDULE_NAME.to_owned()),
            recurrence: patch.recurrence.unwrap_or_default(),
            status: patch.status.unwrap_or_default(),
            email: patch.email.unwrap_or_default(),
            start_date: patch.start_date.unwrap_or(today),
            kpis: patch.kpis.unwrap_or_default(),
            machines: patch.machines.unwrap_or_default(),
        }
    }

    fn merge(&mut self, patch: SchedulePatch) {
        let SchedulePatch {
            name,
            recurrence,
            status,
            email,
            start_date,
            kpis,
            machines,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(recurrence) = recurrence {
            self.recurrence = recurrence;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(start_date) = start_date {
            self.start_date = start_date;
        }
        if let Some(kpis) = kpis {
            self.kpis = kpis;
        }
        if let Some(machines) = machines {
            self.machines = machines;
        }
    }
}
