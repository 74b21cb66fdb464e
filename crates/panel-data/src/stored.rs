//! Entity types held by the data manager

use crate::error::DataError;
use crate::manager::DataManager;
use crate::references;
use crate::store::Collection;
use panel_entity::{Entity, EntityKind, Kpi, Machine, Schedule};

/// Sealed trait - prevents external implementations
#[doc(hidden)]
pub mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}

/// An [`Entity`] with a collection in [`DataManager`]
///
/// Backs the generic accessors (`list::<E>()`, `create::<E>(..)`, ...).
/// Implemented for [`Schedule`], [`Kpi`] and [`Machine`] only.
pub trait Stored: Entity + private::Sealed {
    /// Collection holding this type
    #[doc(hidden)]
    fn collection(manager: &DataManager) -> &Collection<Self>;

    /// Reference check before `record` enters the collection
    ///
    /// `previous` is the record being replaced, for updates.
    #[doc(hidden)]
    fn check_insert(
        manager: &DataManager,
        record: &Self,
        previous: Option<&Self>,
    ) -> Result<(), DataError>;

    /// Reference check before `record` leaves the collection
    #[doc(hidden)]
    fn check_remove(manager: &DataManager, record: &Self) -> Result<(), DataError>;
}

impl private::Sealed for Schedule {}
impl private::Sealed for Kpi {}
impl private::Sealed for Machine {}

impl Stored for Schedule {
    fn collection(manager: &DataManager) -> &Collection<Self> {
        &manager.inner.schedules
    }

    fn check_insert(
        manager: &DataManager,
        record: &Self,
        previous: Option<&Self>,
    ) -> Result<(), DataError> {
        references::check_schedule(manager, record, previous)
    }

    fn check_remove(_manager: &DataManager, _record: &Self) -> Result<(), DataError> {
        Ok(())
    }
}

impl Stored for Kpi {
    fn collection(manager: &DataManager) -> &Collection<Self> {
        &manager.inner.kpis
    }

    fn check_insert(_: &DataManager, _: &Self, _: Option<&Self>) -> Result<(), DataError> {
        Ok(())
    }

    fn check_remove(manager: &DataManager, record: &Self) -> Result<(), DataError> {
        references::check_removal(manager, EntityKind::Kpi, record.id)
    }
}

impl Stored for Machine {
    fn collection(manager: &DataManager) -> &Collection<Self> {
        &manager.inner.machines
    }

    fn check_insert(_: &DataManager, _: &Self, _: Option<&Self>) -> Result<(), DataError> {
        Ok(())
    }

    fn check_remove(manager: &DataManager, record: &Self) -> Result<(), DataError> {
        references::check_removal(manager, EntityKind::Machine, record.id)
    }
}
