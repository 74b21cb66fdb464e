//! Panel Data Manager
//!
//! The process-wide repository behind the factory admin panel. It loads the
//! KPI, machine and schedule collections once, caches them as immutable
//! snapshots, and mediates every create, update and delete.
//!
//! # Core Operations
//!
//! - **Initialize**: single-flight, concurrent per-collection loads with
//!   skip-and-continue decoding ([`DataManager::initialize`])
//! - **Read**: snapshot accessors ([`DataManager::get_schedule_list`],
//!   [`DataManager::get_kpi`], generic [`DataManager::list`])
//! - **Mutate**: optimistic two-phase changes ([`PendingMutation`]) that roll
//!   back when the [`Persistence`] collaborator rejects them
//! - **Check**: schedule references to KPIs and machines, per
//!   [`ReferencePolicy`]
//!
//! # Example
//!
//! ```rust,ignore
//! use panel_data::{install_global, get_instance, DataConfig, DataManager};
//! use panel_entity::SchedulePatch;
//! use panel_resource::FsResourceLoader;
//!
//! # async fn example() -> Result<(), panel_data::DataError> {
//! let manager = DataManager::new(DataConfig::default(), FsResourceLoader::new("public/mockData"));
//! install_global(manager)?;
//!
//! let data = get_instance()?;
//! data.initialize().await?;
//! let created = data
//!     .create_schedule(SchedulePatch::new().name("Weekly OEE").recurrence("Weekly"))?
//!     .commit()
//!     .await?;
//! println!("schedule {} created", created.id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod clock;
pub mod config;
pub mod error;
pub mod global;
pub mod manager;
pub mod mutation;
pub mod persistence;
pub mod references;
pub mod report;
pub mod store;
pub mod stored;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DataConfig, ReferencePolicy, ResourcePaths};
pub use error::{DataError, DataResult};
pub use global::{get_instance, install_global};
pub use manager::{DataManager, DataManagerBuilder, ManagerState};
pub use mutation::PendingMutation;
pub use persistence::{NoopPersistence, Operation, PersistRequest, Persistence, Rejection};
pub use references::DanglingReference;
pub use report::{CollectionOutcome, CollectionReport, InitReport};
pub use store::Collection;
pub use stored::Stored;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the data manager
    pub use crate::config::{DataConfig, ReferencePolicy};
    pub use crate::error::DataError;
    pub use crate::global::{get_instance, install_global};
    pub use crate::manager::{DataManager, ManagerState};
    pub use crate::mutation::PendingMutation;
    pub use crate::persistence::{Persistence, Rejection};
    pub use panel_entity::{EntityId, Kpi, KpiPatch, Machine, MachinePatch, Schedule, SchedulePatch};
}
