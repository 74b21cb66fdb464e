//! Entity identity
//!
//! Integer ids, unique per collection, plus the kind tag used in errors,
//! logs and persistence requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique record identifier within one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// First id handed out to an empty collection
    pub const FIRST: Self = Self(1);

    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Allocate the next id for a collection holding `existing`.
    ///
    /// `max(existing) + 1`, or [`EntityId::FIRST`] when empty. Returns `None`
    /// only when the id space is exhausted.
    #[must_use]
    pub fn allocate<I>(existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        match existing.into_iter().max() {
            Some(max) => max.0.checked_add(1).map(Self),
            None => Some(Self::FIRST),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// The collections a record can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Recurring report schedule
    Schedule,
    /// Key performance indicator
    Kpi,
    /// Shop-floor machine
    Machine,
}

impl EntityKind {
    /// All kinds, in load order
    pub const ALL: [Self; 3] = [Self::Kpi, Self::Machine, Self::Schedule];

    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Kpi => "kpi",
            Self::Machine => "machine",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "schedule" => Ok(Self::Schedule),
            "kpi" => Ok(Self::Kpi),
            "machine" => Ok(Self::Machine),
            _ => Err(format!("unknown entity kind: '{s}'")),
        }
    }
}
