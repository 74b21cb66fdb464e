//! Shop-floor machines

use crate::decode::{Decodable, DecodeError, FieldReader};
use crate::entity::Entity;
use crate::id::{EntityId, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name given to machines created without one
pub const DEFAULT_MACHINE_NAME: &str = "Unnamed Machine";

/// Type given to machines created without one
pub const DEFAULT_MACHINE_TYPE: &str = "Unknown";

/// Machine a schedule can report on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: EntityId,
    /// Display name, e.g. `Assembly Machine 2`
    pub name: String,
    /// Ontology class, e.g. `AssemblyMachine`
    pub machine_type: String,
    pub site: String,
}

impl Decodable for Machine {
    fn decode(raw: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(EntityKind::Machine, raw)?;

        Ok(Self {
            id: fields.id("id")?,
            name: fields.string("name")?,
            machine_type: fields.string("machineType")?,
            site: fields.optional_string("site")?.unwrap_or_default(),
        })
    }
}

/// Partial machine fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachinePatch {
    pub name: Option<String>,
    pub machine_type: Option<String>,
    pub site: Option<String>,
}

impl MachinePatch {
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

    /// With machine type
    #[inline]
    #[must_use]
    pub fn machine_type(mut self, machine_type: impl Into<String>) -> Self {
        self.machine_type = Some(machine_type.into());
        self
    }

    /// With site
    #[inline]
    #[must_use]
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }
}

impl Entity for Machine {
    const KIND: EntityKind = EntityKind::Machine;

    type Patch = MachinePatch;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_patch(id: EntityId, patch: MachinePatch, _today: NaiveDate) -> Self {
        Self {
            id,
            name: patch.name.unwrap_or_else(|| DEFAULT_MACHINE_NAME.to_owned()),
            machine_type: patch
                .machine_type
                .unwrap_or_else(|| DEFAULT_MACHINE_TYPE.to_owned()),
            site: patch.site.unwrap_or_default(),
        }
    }

    fn merge(&mut self, patch: MachinePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(machine_type) = patch.machine_type {
            self.machine_type = machine_type;
        }
        if let Some(site) = patch.site {
            self.site = site;
        }
    }
}
