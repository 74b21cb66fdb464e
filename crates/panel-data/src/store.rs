//! Snapshot collections
//!
//! Each collection is a persistent vector behind a read-write lock. Readers
//! clone the vector (O(1), structurally shared) and keep an immutable
//! snapshot; writers mutate under the write lock, so no reader ever observes
//! a half-applied change.
//!
//! Ids are never handed out twice between loads: allocation continues past
//! the highest id the collection has ever held, even after that record is
//! deleted.

use im::Vector;
use panel_entity::{Entity, EntityId};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One cached entity collection
#[derive(Debug)]
pub struct Collection<E: Clone> {
    records: RwLock<Vector<E>>,
    /// Highest id loaded or allocated since the last `replace`
    high_water: Mutex<Option<EntityId>>,
}

impl<E: Entity> Collection<E> {
    /// Create empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vector::new()),
            high_water: Mutex::new(None),
        }
    }

    /// Immutable snapshot of the current records
    #[must_use]
    pub fn snapshot(&self) -> Vector<E> {
        self.records.read().clone()
    }

    /// Record with the given id
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<E> {
        self.records.read().iter().find(|r| r.id() == id).cloned()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Swap in a freshly loaded collection
    pub fn replace(&self, records: Vec<E>) {
        let mut current = self.records.write();
        *self.high_water.lock() = records.iter().map(Entity::id).max();
        *current = records.into_iter().collect();
    }

    /// Next free id
    ///
    /// One above both the live maximum and every id reserved before.
    /// `None` once the id space is exhausted.
    pub(crate) fn next_id(&self, records: &Vector<E>) -> Option<EntityId> {
        let high_water = *self.high_water.lock();
        EntityId::allocate(records.iter().map(Entity::id).chain(high_water))
    }

    /// Mark `id` as handed out
    pub(crate) fn reserve(&self, id: EntityId) {
        let mut high_water = self.high_water.lock();
        *high_water = (*high_water).max(Some(id));
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vector<E>> {
        self.records.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vector<E>> {
        self.records.write()
    }
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of the record with `id`
pub(crate) fn position<E: Entity>(records: &Vector<E>, id: EntityId) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}
