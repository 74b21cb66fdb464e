//! Key performance indicators

use crate::decode::{Decodable, DecodeError, FieldReader};
use crate::entity::Entity;
use crate::id::{EntityId, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name given to KPIs created without one
pub const DEFAULT_KPI_NAME: &str = "unnamed_kpi";

/// Unit given to KPIs created without one
pub const DEFAULT_KPI_UNIT: &str = "-";

/// Key performance indicator
///
/// `name` is the snake_case identifier the KPI engine computes
/// (`working_time_avg`). Atomic KPIs are measured directly; derived ones
/// carry a `formula` over other KPI names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// Unit of measure
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    pub atomic: bool,
}

impl Decodable for Kpi {
    fn decode(raw: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(EntityKind::Kpi, raw)?;

        let formula = fields.optional_string("formula")?;
        let atomic = fields
            .optional_bool("atomic")?
            .unwrap_or(formula.is_none());

        Ok(Self {
            id: fields.id("id")?,
            name: fields.string("name")?,
            description: fields.optional_string("description")?.unwrap_or_default(),
            unit: fields.string("unit")?,
            formula,
            atomic,
        })
    }
}

/// Partial KPI fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KpiPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    /// `Some(None)` clears the formula; in JSON, `"formula": null` does
    #[serde(deserialize_with = "present")]
    pub formula: Option<Option<String>>,
    pub atomic: Option<bool>,
}

/// Any value that is present, `null` included, becomes `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl KpiPatch {
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

    /// With unit
    #[inline]
    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// With formula (derived KPI)
    #[inline]
    #[must_use]
    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(Some(formula.into()));
        self
    }
}

impl Entity for Kpi {
    const KIND: EntityKind = EntityKind::Kpi;

    type Patch = KpiPatch;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_patch(id: EntityId, patch: KpiPatch, _today: NaiveDate) -> Self {
        let formula = patch.formula.flatten();
        Self {
            id,
            name: patch.name.unwrap_or_else(|| DEFAULT_KPI_NAME.to_owned()),
            description: patch.description.unwrap_or_default(),
            unit: patch.unit.unwrap_or_else(|| DEFAULT_KPI_UNIT.to_owned()),
            atomic: patch.atomic.unwrap_or(formula.is_none()),
            formula,
        }
    }

    fn merge(&mut self, patch: KpiPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(formula) = patch.formula {
            self.formula = formula;
        }
        if let Some(atomic) = patch.atomic {
            self.atomic = atomic;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
    }

    #[test]
    fn decode_atomic_kpi() {
        let kpi = Kpi::decode(&json!({
            "id": 1,
            "name": "working_time_sum",
            "unit": "s"
        }))
        .unwrap();

        assert!(kpi.atomic);
        assert_eq!(kpi.description, "");
        assert_eq!(kpi.formula, None);
    }

    #[test]
    fn decode_derived_kpi_infers_non_atomic() {
        let kpi = Kpi::decode(&json!({
            "id": 2,
            "name": "utilization",
            "unit": "%",
            "formula": "working_time_sum/operative_time"
        }))
        .unwrap();

        assert!(!kpi.atomic);
    }

    #[test]
    fn decode_requires_unit() {
        let err = Kpi::decode(&json!({"id": 2, "name": "utilization"})).unwrap_err();
        assert_eq!(err.field, "unit");
    }

    #[test]
    fn from_patch_defaults() {
        let kpi = Kpi::from_patch(EntityId::new(4), KpiPatch::new(), today());
        assert_eq!(kpi.name, DEFAULT_KPI_NAME);
        assert_eq!(kpi.unit, DEFAULT_KPI_UNIT);
        assert!(kpi.atomic);
    }

    #[test]
    fn merge_can_clear_formula() {
        let mut kpi = Kpi::from_patch(EntityId::new(4), KpiPatch::new().formula("a/b"), today());
        assert!(!kpi.atomic);

        kpi.merge(KpiPatch {
            formula: Some(None),
            ..KpiPatch::default()
        });
        assert_eq!(kpi.formula, None);
        // atomic flag is only changed explicitly
        assert!(!kpi.atomic);
    }

    #[test]
    fn json_patch_distinguishes_null_from_absent() {
        let clear: KpiPatch = serde_json::from_value(json!({"formula": null})).unwrap();
        assert_eq!(clear.formula, Some(None));

        let keep: KpiPatch = serde_json::from_value(json!({"unit": "min"})).unwrap();
        assert_eq!(keep.formula, None);

        let set: KpiPatch = serde_json::from_value(json!({"formula": "a/b"})).unwrap();
        assert_eq!(set.formula, Some(Some("a/b".to_string())));
    }
}
