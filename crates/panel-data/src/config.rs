//! Data manager configuration

use panel_entity::EntityKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when a mutation would leave a schedule pointing at a missing
/// KPI or machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Accept the mutation and log a warning
    #[default]
    Warn,
    /// Refuse the mutation, leaving the cache untouched
    Reject,
}

/// Resource path of each collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    /// Report schedules document
    pub schedules: String,
    /// KPI definitions document
    pub kpis: String,
    /// Machines document
    pub machines: String,
}

impl ResourcePaths {
    /// Path of the given collection
    #[inline]
    #[must_use]
    pub fn path(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Schedule => &self.schedules,
            EntityKind::Kpi => &self.kpis,
            EntityKind::Machine => &self.machines,
        }
    }
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            schedules: "schedules.json".to_string(),
            kpis: "kpis.json".to_string(),
            machines: "machines.json".to_string(),
        }
    }
}

/// Data manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Where each collection is loaded from
    pub resources: ResourcePaths,
    /// Per-collection load deadline in milliseconds
    pub load_timeout_ms: u64,
    /// Dangling reference handling
    pub reference_policy: ReferencePolicy,
}

impl DataConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With resource paths
    #[inline]
    #[must_use]
    pub fn with_resources(mut self, resources: ResourcePaths) -> Self {
        self.resources = resources;
        self
    }

    /// With load timeout
    #[inline]
    #[must_use]
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With reference policy
    #[inline]
    #[must_use]
    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    /// Per-collection load deadline
    #[inline]
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            resources: ResourcePaths::default(),
            load_timeout_ms: 10_000,
            reference_policy: ReferencePolicy::Warn,
        }
    }
}
