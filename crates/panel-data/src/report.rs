//! Initialization outcome

use panel_entity::EntityKind;
use panel_resource::LoadError;

/// How one collection fared during initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Document loaded; `skipped` records failed to decode
    Loaded {
        /// Records now in the cache
        records: usize,
        /// Records dropped by the decoder
        skipped: usize,
    },
    /// Document could not be loaded; the collection is empty
    Failed(LoadError),
}

/// Per-collection entry of an [`InitReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    /// Collection
    pub kind: EntityKind,
    /// Resource path it was loaded from
    pub path: String,
    /// Result
    pub outcome: CollectionOutcome,
}

impl CollectionReport {
    /// Whether the document loaded
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, CollectionOutcome::Loaded { .. })
    }
}

/// Result of a completed initialization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitReport {
    /// One entry per collection, in [`EntityKind::ALL`] order
    pub collections: Vec<CollectionReport>,
}

impl InitReport {
    /// Entry for a collection
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.kind == kind)
    }

    /// Collections that failed to load
    pub fn failures(&self) -> impl Iterator<Item = &CollectionReport> {
        self.collections.iter().filter(|c| !c.is_loaded())
    }

    /// Whether every collection loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.collections.iter().all(CollectionReport::is_loaded)
    }

    /// Total records skipped by decoders
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.collections
            .iter()
            .map(|c| match c.outcome {
                CollectionOutcome::Loaded { skipped, .. } => skipped,
                CollectionOutcome::Failed(_) => 0,
            })
            .sum()
    }
}
