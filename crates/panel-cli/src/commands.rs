//! Subcommand implementations
//!
//! Every command initializes the manager and renders its result as JSON.

use anyhow::Result;
use panel_data::{CollectionOutcome, DataManager, InitReport, Stored};
use panel_entity::{EntityId, EntityKind, Kpi, Machine, Schedule};
use serde_json::{json, Value};

/// What to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Every record of a collection
    List(EntityKind),
    /// One record
    Get(EntityKind, EntityId),
    /// Load report and dangling references
    Check,
}

pub(crate) async fn run(manager: &DataManager, action: &Action) -> Result<Value> {
    let report = manager.initialize().await?;

    match action {
        Action::List(kind) => match kind {
            EntityKind::Schedule => list::<Schedule>(manager),
            EntityKind::Kpi => list::<Kpi>(manager),
            EntityKind::Machine => list::<Machine>(manager),
        },
        Action::Get(kind, id) => match kind {
            EntityKind::Schedule => get::<Schedule>(manager, *id),
            EntityKind::Kpi => get::<Kpi>(manager, *id),
            EntityKind::Machine => get::<Machine>(manager, *id),
        },
        Action::Check => check(manager, &report),
    }
}

fn list<E: Stored>(manager: &DataManager) -> Result<Value> {
    let records: Vec<E> = manager.list::<E>()?.into_iter().collect();
    Ok(serde_json::to_value(records)?)
}

fn get<E: Stored>(manager: &DataManager, id: EntityId) -> Result<Value> {
    Ok(serde_json::to_value(manager.get::<E>(id)?)?)
}

fn check(manager: &DataManager, report: &InitReport) -> Result<Value> {
    let collections: Vec<Value> = report
        .collections
        .iter()
        .map(|c| match &c.outcome {
            CollectionOutcome::Loaded { records, skipped } => json!({
                "kind": c.kind,
                "path": c.path,
                "status": "loaded",
                "records": records,
                "skipped": skipped,
            }),
            CollectionOutcome::Failed(error) => json!({
                "kind": c.kind,
                "path": c.path,
                "status": "failed",
                "error": error.to_string(),
            }),
        })
        .collect();

    Ok(json!({
        "collections": collections,
        "dangling": manager.dangling_references()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_data::DataConfig;
    use panel_resource::InMemoryResourceLoader;
    use panel_test_utils::{id, manager_with, sample_loader, KPIS_JSON};

    #[tokio::test]
    async fn list_renders_resource_field_names() {
        let manager = manager_with(sample_loader(), DataConfig::default());

        let output = run(&manager, &Action::List(EntityKind::Machine)).await.unwrap();

        assert_eq!(output.as_array().unwrap().len(), 4);
        assert_eq!(output[0]["machineType"], "AssemblyMachine");
    }

    #[tokio::test]
    async fn get_missing_record_fails() {
        let manager = manager_with(sample_loader(), DataConfig::default());

        let err = run(&manager, &Action::Get(EntityKind::Kpi, id(42))).await.unwrap_err();
        assert_eq!(err.to_string(), "kpi 42 not found");
    }

    #[tokio::test]
    async fn check_reports_failures_and_dangling_references() {
        let loader = InMemoryResourceLoader::new()
            .with_document("kpis.json", KPIS_JSON)
            .with_document(
                "schedules.json",
                r#"[{"id": 1, "name": "Daily", "recurrence": "Daily", "status": "Active",
                     "email": "", "startDate": "2024-10-01", "kpis": [1, 9], "machines": [2]}]"#,
            );
        let manager = manager_with(loader, DataConfig::default());

        let output = run(&manager, &Action::Check).await.unwrap();

        assert_eq!(output["collections"][0]["status"], "loaded");
        assert_eq!(output["collections"][1]["kind"], "machine");
        assert_eq!(output["collections"][1]["status"], "failed");
        assert_eq!(
            output["dangling"],
            json!([
                {"schedule": 1, "kind": "kpi", "id": 9},
                {"schedule": 1, "kind": "machine", "id": 2}
            ])
        );
    }
}
