//! Data manager
//!
//! Owns the cached collections and their lifecycle:
//!
//! ```text
//! Uninitialized ──initialize()──▶ Initializing ──▶ Ready
//!                                      │
//!                                      └──(no collection loaded)──▶ Failed ──initialize()──▶ Initializing
//! ```
//!
//! `initialize` is single-flight: the in-flight load is a shared future stored
//! in the state machine, so concurrent callers all await the same fetches.

use crate::clock::{Clock, SystemClock};
use crate::config::DataConfig;
use crate::error::DataError;
use crate::mutation::{PendingMutation, Undo};
use crate::persistence::{NoopPersistence, Operation, Persistence};
use crate::report::{CollectionOutcome, CollectionReport, InitReport};
use crate::store::{position, Collection};
use crate::stored::Stored;
use futures::future::{BoxFuture, FutureExt, Shared};
use im::Vector;
use panel_entity::{
    Entity, EntityId, Kpi, KpiPatch, Machine, MachinePatch, Schedule, SchedulePatch,
};
use panel_resource::{load_collection_with_timeout, CollectionLoad, LoadError, ResourceLoader};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

type InitFlight = Shared<BoxFuture<'static, Result<InitReport, DataError>>>;

/// Internal lifecycle state
enum Phase {
    Uninitialized,
    Initializing(InitFlight),
    Ready(InitReport),
    Failed(DataError),
}

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerState {
    /// `initialize` has not been called
    Uninitialized,
    /// A load is in flight
    Initializing,
    /// Collections are cached; accessors and mutations are available
    Ready,
    /// No collection could be loaded; `initialize` may be retried
    Failed,
}

pub(crate) struct Inner {
    pub(crate) config: DataConfig,
    loader: Arc<dyn ResourceLoader>,
    pub(crate) persistence: Arc<dyn Persistence>,
    clock: Arc<dyn Clock>,
    phase: Mutex<Phase>,
    /// Serializes mutations across collections
    pub(crate) mutation_gate: Mutex<()>,
    pub(crate) schedules: Collection<Schedule>,
    pub(crate) kpis: Collection<Kpi>,
    pub(crate) machines: Collection<Machine>,
}

/// Cached repository of panel collections
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct DataManager {
    pub(crate) inner: Arc<Inner>,
}

/// Builder for [`DataManager`]
pub struct DataManagerBuilder {
    config: DataConfig,
    loader: Arc<dyn ResourceLoader>,
    persistence: Arc<dyn Persistence>,
    clock: Arc<dyn Clock>,
}

impl DataManagerBuilder {
    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: DataConfig) -> Self {
        self.config = config;
        self
    }

    /// With persistence collaborator
    #[inline]
    #[must_use]
    pub fn with_persistence(mut self, persistence: impl Persistence) -> Self {
        self.persistence = Arc::new(persistence);
        self
    }

    /// With calendar source
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Build the manager in the `Uninitialized` state
    #[must_use]
    pub fn build(self) -> DataManager {
        DataManager {
            inner: Arc::new(Inner {
                config: self.config,
                loader: self.loader,
                persistence: self.persistence,
                clock: self.clock,
                phase: Mutex::new(Phase::Uninitialized),
                mutation_gate: Mutex::new(()),
                schedules: Collection::new(),
                kpis: Collection::new(),
                machines: Collection::new(),
            }),
        }
    }
}

impl DataManager {
    /// Start building a manager over `loader`
    ///
    /// Defaults: [`DataConfig::default`], [`NoopPersistence`], [`SystemClock`].
    #[must_use]
    pub fn builder(loader: impl ResourceLoader) -> DataManagerBuilder {
        DataManagerBuilder {
            config: DataConfig::default(),
            loader: Arc::new(loader),
            persistence: Arc::new(NoopPersistence),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create manager with configuration and default collaborators
    #[must_use]
    pub fn new(config: DataConfig, loader: impl ResourceLoader) -> Self {
        Self::builder(loader).with_config(config).build()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DataConfig {
        &self.inner.config
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ManagerState {
        match &*self.inner.phase.lock() {
            Phase::Uninitialized => ManagerState::Uninitialized,
            Phase::Initializing(_) => ManagerState::Initializing,
            Phase::Ready(_) => ManagerState::Ready,
            Phase::Failed(_) => ManagerState::Failed,
        }
    }

    /// Report of the completed initialization, if any
    #[must_use]
    pub fn report(&self) -> Option<InitReport> {
        match &*self.inner.phase.lock() {
            Phase::Ready(report) => Some(report.clone()),
            _ => None,
        }
    }

    /// Load every collection, exactly once
    ///
    /// Collections load concurrently, each bounded by the configured timeout.
    /// Callers arriving while a load is in flight await that same load; once
    /// `Ready`, the cached report is returned immediately. A collection that
    /// fails to load is left empty and reported; only when all of them fail
    /// does initialization fail, and a later call retries.
    ///
    /// The load progresses while at least one caller awaits it.
    ///
    /// # Errors
    /// [`DataError::InitializationFailed`] when no collection loaded.
    pub async fn initialize(&self) -> Result<InitReport, DataError> {
        let flight = {
            let mut phase = self.inner.phase.lock();
            match &*phase {
                Phase::Ready(report) => return Ok(report.clone()),
                Phase::Initializing(flight) => flight.clone(),
                Phase::Uninitialized | Phase::Failed(_) => {
                    let flight = Inner::load_all(Arc::clone(&self.inner)).boxed().shared();
                    *phase = Phase::Initializing(flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), DataError> {
        match &*self.inner.phase.lock() {
            Phase::Ready(_) => Ok(()),
            _ => Err(DataError::NotInitialized),
        }
    }

    /// Snapshot of a collection
    ///
    /// # Errors
    /// [`DataError::NotInitialized`] before `Ready`.
    pub fn list<E: Stored>(&self) -> Result<Vector<E>, DataError> {
        self.ensure_ready()?;
        Ok(E::collection(self).snapshot())
    }

    /// Record by id
    ///
    /// # Errors
    /// [`DataError::NotFound`] when absent, [`DataError::NotInitialized`]
    /// before `Ready`.
    pub fn get<E: Stored>(&self, id: EntityId) -> Result<E, DataError> {
        self.ensure_ready()?;
        E::collection(self)
            .find(id)
            .ok_or_else(|| DataError::not_found(E::KIND, id))
    }

    /// Create a record from `patch`, defaulting omitted fields
    ///
    /// The record is appended to the cache with the next free id before this
    /// returns; persist it with [`PendingMutation::commit`].
    ///
    /// # Errors
    /// [`DataError::NotInitialized`], [`DataError::IdsExhausted`], or a
    /// reference violation under [`crate::ReferencePolicy::Reject`].
    pub fn create<E: Stored>(&self, patch: E::Patch) -> Result<PendingMutation<E>, DataError> {
        self.ensure_ready()?;
        let _gate = self.inner.mutation_gate.lock();
        let mut records = E::collection(self).write();

        let id = E::collection(self)
            .next_id(&records)
            .ok_or(DataError::IdsExhausted { kind: E::KIND })?;
        let record = E::from_patch(id, patch, self.inner.clock.today());
        E::check_insert(self, &record, None)?;

        E::collection(self).reserve(id);
        records.push_back(record.clone());
        tracing::debug!(kind = %E::KIND, %id, "created record");

        Ok(PendingMutation::new(
            self.clone(),
            Operation::Create,
            record,
            Undo::Remove(id),
        ))
    }

    /// Shallow-merge `patch` into the record with `id`
    ///
    /// # Errors
    /// [`DataError::NotFound`], [`DataError::NotInitialized`], or a reference
    /// violation under [`crate::ReferencePolicy::Reject`].
    pub fn update<E: Stored>(
        &self,
        id: EntityId,
        patch: E::Patch,
    ) -> Result<PendingMutation<E>, DataError> {
        self.ensure_ready()?;
        let _gate = self.inner.mutation_gate.lock();
        let mut records = E::collection(self).write();

        let index = position(&records, id).ok_or_else(|| DataError::not_found(E::KIND, id))?;
        let previous = records[index].clone();
        let mut updated = previous.clone();
        updated.merge(patch);
        E::check_insert(self, &updated, Some(&previous))?;

        records[index] = updated.clone();
        tracing::debug!(kind = %E::KIND, %id, "updated record");

        Ok(PendingMutation::new(
            self.clone(),
            Operation::Update,
            updated,
            Undo::Restore(previous),
        ))
    }

    /// Remove the record with `id`
    ///
    /// # Errors
    /// [`DataError::NotFound`], [`DataError::NotInitialized`], or
    /// [`DataError::StillReferenced`] under [`crate::ReferencePolicy::Reject`].
    pub fn delete<E: Stored>(&self, id: EntityId) -> Result<PendingMutation<E>, DataError> {
        self.ensure_ready()?;
        let _gate = self.inner.mutation_gate.lock();
        let mut records = E::collection(self).write();

        let index = position(&records, id).ok_or_else(|| DataError::not_found(E::KIND, id))?;
        E::check_remove(self, &records[index])?;

        let record = records.remove(index);
        tracing::debug!(kind = %E::KIND, %id, "deleted record");

        Ok(PendingMutation::new(
            self.clone(),
            Operation::Delete,
            record.clone(),
            Undo::Reinsert { index, record },
        ))
    }

    /// All schedules
    ///
    /// # Errors
    /// [`DataError::NotInitialized`] before `Ready`.
    pub fn get_schedule_list(&self) -> Result<Vector<Schedule>, DataError> {
        self.list()
    }

    /// All KPIs
    ///
    /// # Errors
    /// [`DataError::NotInitialized`] before `Ready`.
    pub fn get_kpi_list(&self) -> Result<Vector<Kpi>, DataError> {
        self.list()
    }

    /// All machines
    ///
    /// # Errors
    /// [`DataError::NotInitialized`] before `Ready`.
    pub fn get_machine_list(&self) -> Result<Vector<Machine>, DataError> {
        self.list()
    }

    /// Schedule by id
    ///
    /// # Errors
    /// See [`DataManager::get`].
    pub fn get_schedule(&self, id: EntityId) -> Result<Schedule, DataError> {
        self.get(id)
    }

    /// KPI by id
    ///
    /// # Errors
    /// See [`DataManager::get`].
    pub fn get_kpi(&self, id: EntityId) -> Result<Kpi, DataError> {
        self.get(id)
    }

    /// Machine by id
    ///
    /// # Errors
    /// See [`DataManager::get`].
    pub fn get_machine(&self, id: EntityId) -> Result<Machine, DataError> {
        self.get(id)
    }

    /// Create a schedule
    ///
    /// # Errors
    /// See [`DataManager::create`].
    pub fn create_schedule(
        &self,
        patch: SchedulePatch,
    ) -> Result<PendingMutation<Schedule>, DataError> {
        self.create(patch)
    }

    /// Create a KPI
    ///
    /// # Errors
    /// See [`DataManager::create`].
    pub fn create_kpi(&self, patch: KpiPatch) -> Result<PendingMutation<Kpi>, DataError> {
        self.create(patch)
    }

    /// Create a machine
    ///
    /// # Errors
    /// See [`DataManager::create`].
    pub fn create_machine(
        &self,
        patch: MachinePatch,
    ) -> Result<PendingMutation<Machine>, DataError> {
        self.create(patch)
    }

    /// Update a schedule
    ///
    /// # Errors
    /// See [`DataManager::update`].
    pub fn update_schedule(
        &self,
        id: EntityId,
        patch: SchedulePatch,
    ) -> Result<PendingMutation<Schedule>, DataError> {
        self.update(id, patch)
    }

    /// Update a KPI
    ///
    /// # Errors
    /// See [`DataManager::update`].
    pub fn update_kpi(&self, id: EntityId, patch: KpiPatch) -> Result<PendingMutation<Kpi>, DataError> {
        self.update(id, patch)
    }

    /// Update a machine
    ///
    /// # Errors
    /// See [`DataManager::update`].
    pub fn update_machine(
        &self,
        id: EntityId,
        patch: MachinePatch,
    ) -> Result<PendingMutation<Machine>, DataError> {
        self.update(id, patch)
    }

    /// Delete a schedule
    ///
    /// # Errors
    /// See [`DataManager::delete`].
    pub fn delete_schedule(&self, id: EntityId) -> Result<PendingMutation<Schedule>, DataError> {
        self.delete(id)
    }

    /// Delete a KPI
    ///
    /// # Errors
    /// See [`DataManager::delete`].
    pub fn delete_kpi(&self, id: EntityId) -> Result<PendingMutation<Kpi>, DataError> {
        self.delete(id)
    }

    /// Delete a machine
    ///
    /// # Errors
    /// See [`DataManager::delete`].
    pub fn delete_machine(&self, id: EntityId) -> Result<PendingMutation<Machine>, DataError> {
        self.delete(id)
    }
}

impl fmt::Debug for DataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataManager")
            .field("state", &self.state())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Body of the shared initialization future
    async fn load_all(inner: Arc<Self>) -> Result<InitReport, DataError> {
        let started = Instant::now();
        let timeout = inner.config.load_timeout();
        let paths = &inner.config.resources;
        tracing::info!(timeout_ms = inner.config.load_timeout_ms, "initializing data manager");

        let loader = &*inner.loader;
        let (kpis, machines, schedules) = tokio::join!(
            load_collection_with_timeout::<Kpi, _>(loader, &paths.kpis, timeout),
            load_collection_with_timeout::<Machine, _>(loader, &paths.machines, timeout),
            load_collection_with_timeout::<Schedule, _>(loader, &paths.schedules, timeout),
        );

        let report = InitReport {
            collections: vec![
                install(&inner.kpis, &paths.kpis, kpis),
                install(&inner.machines, &paths.machines, machines),
                install(&inner.schedules, &paths.schedules, schedules),
            ],
        };

        let result = if report.collections.iter().any(CollectionReport::is_loaded) {
            tracing::info!(
                schedules = inner.schedules.len(),
                kpis = inner.kpis.len(),
                machines = inner.machines.len(),
                skipped = report.skipped(),
                elapsed_ms = started.elapsed().as_millis(),
                "data manager ready"
            );
            Ok(report)
        } else {
            let errors = report
                .collections
                .into_iter()
                .filter_map(|c| match c.outcome {
                    CollectionOutcome::Failed(error) => Some(error),
                    CollectionOutcome::Loaded { .. } => None,
                })
                .collect();
            let error = DataError::InitializationFailed { errors };
            tracing::error!(error = %error, "data manager initialization failed");
            Err(error)
        };

        *inner.phase.lock() = match &result {
            Ok(report) => Phase::Ready(report.clone()),
            Err(error) => Phase::Failed(error.clone()),
        };
        result
    }
}

/// Swap a load result into its collection
fn install<E: Entity>(
    collection: &Collection<E>,
    path: &str,
    result: Result<CollectionLoad<E>, LoadError>,
) -> CollectionReport {
    let outcome = match result {
        Ok(load) => {
            let skipped = load.skipped_count();
            let records = load.into_records();
            let count = records.len();
            collection.replace(records);
            CollectionOutcome::Loaded {
                records: count,
                skipped,
            }
        }
        Err(error) => {
            tracing::warn!(kind = %E::KIND, path, error = %error, "collection failed to load, leaving it empty");
            collection.replace(Vec::new());
            CollectionOutcome::Failed(error)
        }
    };

    CollectionReport {
        kind: E::KIND,
        path: path.to_string(),
        outcome,
    }
}
