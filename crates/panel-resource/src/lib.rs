//! Panel Resource Layer
//!
//! The boundary between persisted JSON resources and the typed entity
//! collections held by the data manager.
//!
//! # Core Operations
//!
//! - **Fetch**: [`ResourceLoader`] reads a named resource into a [`ParsedDocument`]
//! - **Decode**: [`load_collection`] applies the entity decoder element-wise,
//!   skipping (and logging) records that fail to decode
//!
//! Fetch failures and document syntax failures are reported as [`LoadError`];
//! record-level decode failures never are.
//!
//! # Architecture
//!
//! ```text
//! resource path → ResourceLoader → ParsedDocument → Decodable::decode (per record) → Vec<E>
//!                  (fs / in-memory)                     ↳ skipped + tracing::warn!
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use panel_resource::{load_collection, FsResourceLoader};
//! use panel_entity::Schedule;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = FsResourceLoader::new("public/mockData");
//! let load = load_collection::<Schedule, _>(&loader, "schedules.json").await?;
//! println!("{} schedules, {} skipped", load.records.len(), load.skipped.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod collection;
pub mod document;
pub mod error;
pub mod fs;
pub mod loader;
pub mod memory;

// Re-exports for convenience
pub use collection::{
    decode_records, load_collection, load_collection_with_timeout, CollectionLoad, SkippedRecord,
};
pub use document::{JsonDocumentParser, ParsedDocument};
pub use error::{LoadError, LoadResult};
pub use fs::FsResourceLoader;
pub use loader::ResourceLoader;
pub use memory::InMemoryResourceLoader;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the resource layer
    pub use crate::collection::{load_collection, load_collection_with_timeout, CollectionLoad};
    pub use crate::document::ParsedDocument;
    pub use crate::error::LoadError;
    pub use crate::fs::FsResourceLoader;
    pub use crate::loader::ResourceLoader;
    pub use crate::memory::InMemoryResourceLoader;
}
