//! Entity collections
//!
//! Turns an array document into typed entities with skip-and-continue
//! semantics: a record that fails to decode is logged and dropped, its
//! siblings are kept in source order. Ids are unique per collection; a
//! record repeating an earlier id is dropped the same way.

use crate::error::LoadError;
use crate::loader::ResourceLoader;
use panel_entity::{DecodeError, Entity};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

/// A record dropped during decoding
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the source array
    pub index: usize,
    /// Why it was dropped
    pub error: DecodeError,
}

/// Result of loading one collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionLoad<E> {
    /// Decoded records, in source order
    pub records: Vec<E>,
    /// Records that failed to decode
    pub skipped: Vec<SkippedRecord>,
}

impl<E> CollectionLoad<E> {
    /// Number of records dropped
    #[inline]
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Discard the skip report
    #[inline]
    #[must_use]
    pub fn into_records(self) -> Vec<E> {
        self.records
    }
}

/// Decode every element of an array document
///
/// Never fails: each bad element becomes a [`SkippedRecord`] and a warning.
/// The first record with a given id wins.
pub fn decode_records<E: Entity>(path: &str, values: Vec<Value>) -> CollectionLoad<E> {
    let mut records = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();
    let mut seen = HashSet::with_capacity(values.len());

    for (index, raw) in values.iter().enumerate() {
        let decoded = E::decode(raw).and_then(|record| {
            if seen.insert(record.id()) {
                Ok(record)
            } else {
                Err(DecodeError::duplicate_id(E::KIND, record.id()))
            }
        });

        match decoded {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(
                    kind = %E::KIND,
                    path,
                    index,
                    field = %error.field,
                    error = %error,
                    "skipping record that failed to decode"
                );
                skipped.push(SkippedRecord { index, error });
            }
        }
    }

    CollectionLoad { records, skipped }
}

/// Load and decode the collection at `path`
///
/// # Errors
/// Propagates the loader's [`LoadError`]; an object document is
/// `MalformedDocument`. Record-level failures are not errors.
pub async fn load_collection<E, L>(loader: &L, path: &str) -> Result<CollectionLoad<E>, LoadError>
where
    E: Entity,
    L: ResourceLoader + ?Sized,
{
    tracing::debug!(kind = %E::KIND, path, "loading collection");

    let values = loader.load(path).await?.into_array(path)?;
    let load = decode_records::<E>(path, values);

    tracing::debug!(
        kind = %E::KIND,
        path,
        records = load.records.len(),
        skipped = load.skipped_count(),
        "collection decoded"
    );
    Ok(load)
}

/// [`load_collection`] bounded by a deadline
///
/// # Errors
/// `LoadError::Timeout` when the deadline passes first, otherwise as
/// [`load_collection`].
pub async fn load_collection_with_timeout<E, L>(
    loader: &L,
    path: &str,
    after: Duration,
) -> Result<CollectionLoad<E>, LoadError>
where
    E: Entity,
    L: ResourceLoader + ?Sized,
{
    tokio::time::timeout(after, load_collection::<E, L>(loader, path))
        .await
        .map_err(|_| LoadError::Timeout {
            path: path.to_string(),
            after,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;
    use crate::memory::InMemoryResourceLoader;
    use async_trait::async_trait;
    use panel_entity::{EntityId, Kpi, Machine, Schedule};
    use pretty_assertions::assert_eq;

    const SCHEDULES: &str = r#"[
        {"id": 1, "name": "Weekly digest", "recurrence": "Weekly", "status": "Active",
         "email": "ops@example.com", "startDate": "2024-10-01", "kpis": [1, 2], "machines": [3]},
        {"id": 2, "recurrence": "Daily", "status": "Active",
         "email": "ops@example.com", "startDate": "2024-10-02", "kpis": [], "machines": []},
        {"id": 3, "name": "Monthly", "recurrence": "Monthly", "status": "Paused",
         "email": "", "startDate": "2024-13-01", "kpis": [], "machines": []},
        {"id": 4, "name": "Daily", "recurrence": "Daily", "status": "Active",
         "email": "", "startDate": "2024-11-05", "kpis": [2], "machines": [], "extra": true}
    ]"#;

    #[tokio::test]
    async fn bad_records_are_skipped_in_order() {
        let loader = InMemoryResourceLoader::new().with_document("schedules.json", SCHEDULES);
        let load = load_collection::<Schedule, _>(&loader, "schedules.json")
            .await
            .unwrap();

        let ids: Vec<EntityId> = load.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![EntityId::new(1), EntityId::new(4)]);

        let skipped: Vec<(usize, &str)> = load
            .skipped
            .iter()
            .map(|s| (s.index, s.error.field.as_str()))
            .collect();
        assert_eq!(skipped, vec![(1, "name"), (2, "startDate")]);
    }

    #[tokio::test]
    async fn empty_array_is_empty_collection() {
        let loader = InMemoryResourceLoader::new().with_document("kpis.json", "[]");
        let load = load_collection::<Kpi, _>(&loader, "kpis.json").await.unwrap();
        assert!(load.records.is_empty());
        assert_eq!(load.skipped_count(), 0);
    }

    #[tokio::test]
    async fn object_document_is_malformed() {
        let loader = InMemoryResourceLoader::new().with_document("machines.json", r#"{"id": 1}"#);
        let err = load_collection::<Machine, _>(&loader, "machines.json")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument { .. }));
    }

    #[tokio::test]
    async fn loader_errors_propagate() {
        let loader = InMemoryResourceLoader::new();
        let err = load_collection::<Machine, _>(&loader, "machines.json")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ResourceUnavailable { .. }));
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let values = vec![
            serde_json::json!(7),
            serde_json::json!({"id": 2, "name": "Cutting Machine 1", "machineType": "LaserCutter"}),
        ];
        let load = decode_records::<Machine>("machines.json", values);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.skipped[0].index, 0);
        assert_eq!(load.skipped[0].error.field, panel_entity::RECORD_FIELD);
    }

    #[test]
    fn repeated_id_keeps_the_first_record() {
        let values = vec![
            serde_json::json!({"id": 1, "name": "Laser Cutter", "machineType": "LaserCutter"}),
            serde_json::json!({"id": 2, "name": "Riveting Machine", "machineType": "RivetingMachine"}),
            serde_json::json!({"id": 1, "name": "Laser Cutter 2", "machineType": "LaserCutter"}),
        ];
        let load = decode_records::<Machine>("machines.json", values);

        let names: Vec<&str> = load.records.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Laser Cutter", "Riveting Machine"]);
        assert_eq!(load.skipped.len(), 1);
        assert_eq!(load.skipped[0].index, 2);
        assert_eq!(
            load.skipped[0].error.violation,
            panel_entity::Violation::DuplicateId { id: EntityId::new(1) }
        );
    }

    struct NeverLoader;

    #[async_trait]
    impl ResourceLoader for NeverLoader {
        async fn load(&self, _path: &str) -> Result<ParsedDocument, LoadError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_yields_timeout() {
        let err = load_collection_with_timeout::<Kpi, _>(
            &NeverLoader,
            "kpis.json",
            Duration::from_millis(250),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            LoadError::Timeout {
                path: "kpis.json".into(),
                after: Duration::from_millis(250),
            }
        );
    }
}
