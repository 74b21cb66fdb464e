//! Testing utilities for the panel workspace
//!
//! Shared fixtures, instrumented loaders and a scripted persistence
//! collaborator.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use panel_data::{DataConfig, DataManager, FixedClock, PersistRequest, Persistence, Rejection};
use panel_resource::{InMemoryResourceLoader, LoadError, ParsedDocument, ResourceLoader};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const KPIS_JSON: &str = r#"[
    {"id": 1, "name": "working_time_avg", "description": "Average working time", "unit": "s"},
    {"id": 2, "name": "offline_time_avg", "description": "Average offline time", "unit": "s"},
    {"id": 3, "name": "energy_consumption_sum", "unit": "kWh"},
    {"id": 5, "name": "utilization_rate", "unit": "%",
     "formula": "working_time_sum/operative_time", "atomic": false}
]"#;

pub const MACHINES_JSON: &str = r#"[
    {"id": 1, "name": "Assembly Machine 1", "machineType": "AssemblyMachine", "site": "Plant A"},
    {"id": 2, "name": "Assembly Machine 2", "machineType": "AssemblyMachine", "site": "Plant A"},
    {"id": 3, "name": "Laser Cutter", "machineType": "LaserCutter"},
    {"id": 7, "name": "Testing Machine 1", "machineType": "TestingMachine", "site": "Plant B"}
]"#;

pub const SCHEDULES_JSON: &str = r#"[
    {"id": 1, "name": "Daily OEE", "recurrence": "Daily", "status": "Active",
     "email": "ops@example.com", "startDate": "2024-10-01", "kpis": [1, 2], "machines": [1, 2]},
    {"id": 2, "name": "Weekly energy", "recurrence": "Weekly", "status": "Paused",
     "email": "energy@example.com", "startDate": "2024-10-07", "kpis": [3], "machines": [3, 7]},
    {"id": 4, "name": "Monthly utilization", "recurrence": "Monthly", "status": "Active",
     "email": "plant@example.com", "startDate": "2024-11-01", "kpis": [5], "machines": [7]}
]"#;

/// Schedules where the second and fourth records are broken
pub const SCHEDULES_WITH_BAD_RECORDS_JSON: &str = r#"[
    {"id": 1, "name": "Daily OEE", "recurrence": "Daily", "status": "Active",
     "email": "ops@example.com", "startDate": "2024-10-01", "kpis": [1], "machines": [1]},
    {"id": 2, "recurrence": "Weekly", "status": "Active",
     "email": "ops@example.com", "startDate": "2024-10-07", "kpis": [], "machines": []},
    {"id": 3, "name": "Shift report", "recurrence": "Daily", "status": "Active",
     "email": "", "startDate": "2024-10-09", "kpis": [], "machines": []},
    {"id": 4, "name": "Broken date", "recurrence": "Daily", "status": "Active",
     "email": "", "startDate": "yesterday", "kpis": [], "machines": []},
    {"id": 5, "name": "Night shift", "recurrence": "Daily", "status": "Active",
     "email": "", "startDate": "2024-10-11", "kpis": [2], "machines": [2]}
]"#;

/// Date every test manager treats as today
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
}

pub fn id(raw: u64) -> panel_entity::EntityId {
    panel_entity::EntityId::new(raw)
}

/// Loader serving the three sample documents
pub fn sample_loader() -> InMemoryResourceLoader {
    InMemoryResourceLoader::new()
        .with_document("kpis.json", KPIS_JSON)
        .with_document("machines.json", MACHINES_JSON)
        .with_document("schedules.json", SCHEDULES_JSON)
}

/// Uninitialized manager over `loader` with a fixed clock
pub fn manager_with(loader: impl ResourceLoader, config: DataConfig) -> DataManager {
    DataManager::builder(loader)
        .with_config(config)
        .with_clock(FixedClock(today()))
        .build()
}

/// Initialized manager over the sample documents
pub async fn ready_manager() -> DataManager {
    let manager = manager_with(sample_loader(), DataConfig::default());
    manager.initialize().await.unwrap();
    manager
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Loader wrapper that counts fetches and can delay them
#[derive(Default)]
pub struct CountingLoader<L> {
    inner: L,
    total: AtomicUsize,
    per_path: DashMap<String, usize>,
    delays: DashMap<String, Duration>,
}

impl<L: ResourceLoader> CountingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            total: AtomicUsize::new(0),
            per_path: DashMap::new(),
            delays: DashMap::new(),
        }
    }

    /// Sleep before serving `path`
    #[must_use]
    pub fn with_delay(self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn count(&self, path: &str) -> usize {
        self.per_path.get(path).map_or(0, |count| *count)
    }
}

#[async_trait]
impl<L: ResourceLoader> ResourceLoader for CountingLoader<L> {
    async fn load(&self, path: &str) -> Result<ParsedDocument, LoadError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.per_path.entry(path.to_string()).or_insert(0) += 1;

        let delay = self.delays.get(path).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.load(path).await
    }
}

/// Persistence collaborator with scripted verdicts
///
/// Accepts by default; queued rejections are consumed one per request.
#[derive(Default)]
pub struct ScriptedPersistence {
    script: Mutex<VecDeque<Option<String>>>,
    reject_all: Mutex<Option<String>>,
    requests: Mutex<Vec<PersistRequest>>,
}

impl ScriptedPersistence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Accept the next request
    pub fn accept_next(&self) {
        self.script.lock().push_back(None);
    }

    /// Reject the next request
    pub fn reject_next(&self, reason: &str) {
        self.script.lock().push_back(Some(reason.to_string()));
    }

    /// Reject every request not otherwise scripted
    pub fn reject_all(&self, reason: &str) {
        *self.reject_all.lock() = Some(reason.to_string());
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<PersistRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Persistence for ScriptedPersistence {
    async fn persist(&self, request: PersistRequest) -> Result<(), Rejection> {
        self.requests.lock().push(request);

        let verdict = match self.script.lock().pop_front() {
            Some(verdict) => verdict,
            None => self.reject_all.lock().clone(),
        };
        match verdict {
            Some(reason) => Err(Rejection::new(reason)),
            None => Ok(()),
        }
    }
}
