//! Entity trait
//!
//! Decodable records that can also be created from partial fields and
//! shallow-merged with a patch.

use crate::decode::Decodable;
use crate::id::{EntityId, EntityKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for collection records
///
/// # Contract
/// - `id()` is stable for the lifetime of the record
/// - `from_patch` fills every omitted field with its documented default
/// - `merge` only touches fields present in the patch
/// - serializing and decoding the result yields an equal record
pub trait Entity:
    Decodable + Serialize + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// Collection this type lives in
    const KIND: EntityKind;

    /// Partial fields, all optional
    type Patch: Clone + Debug + Default + Send + Sync + 'static;

    /// Record id
    fn id(&self) -> EntityId;

    /// Build a new record, defaulting omitted fields
    ///
    /// `today` backs date fields that default to the current calendar date.
    fn from_patch(id: EntityId, patch: Self::Patch, today: NaiveDate) -> Self;

    /// Shallow merge: fields set in `patch` replace the current values
    fn merge(&mut self, patch: Self::Patch);
}
