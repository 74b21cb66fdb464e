//! Create, update and delete through the data manager

use panel_data::{DataConfig, DataError, Operation};
use panel_entity::{
    Decodable, EntityKind, Kpi, KpiPatch, Machine, MachinePatch, Recurrence, Schedule,
    SchedulePatch, ScheduleStatus, DEFAULT_SCHEDULE_NAME,
};
use panel_test_utils::{id, ready_manager, sample_loader, today, ScriptedPersistence};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn create_then_get_returns_equal_entity() {
    let manager = ready_manager().await;
    let before: Vec<_> = manager.get_schedule_list().unwrap().iter().map(|s| s.id).collect();

    let created = manager
        .create_schedule(
            SchedulePatch::new()
                .name("Energy digest")
                .recurrence("Weekly")
                .email("energy@example.com")
                .kpis([id(3)])
                .machines([id(1), id(3)]),
        )
        .unwrap()
        .commit()
        .await
        .unwrap();

    assert!(before.iter().all(|existing| created.id > *existing));
    assert_eq!(manager.get_schedule(created.id).unwrap(), created);
    assert_eq!(manager.get_schedule_list().unwrap().len(), before.len() + 1);
}

#[tokio::test]
async fn created_schedule_has_documented_defaults() {
    let manager = ready_manager().await;

    let pending = manager.create_schedule(SchedulePatch::new()).unwrap();
    let schedule = pending.record().clone();

    assert_eq!(schedule.id, id(5));
    assert_eq!(schedule.name, DEFAULT_SCHEDULE_NAME);
    assert_eq!(schedule.recurrence, Recurrence::Daily);
    assert_eq!(schedule.status, ScheduleStatus::Active);
    assert_eq!(schedule.email, "");
    assert_eq!(schedule.start_date, today());
    assert!(schedule.kpis.is_empty() && schedule.machines.is_empty());

    let raw = serde_json::to_value(&schedule).unwrap();
    assert_eq!(Schedule::decode(&raw).unwrap(), schedule);
}

#[tokio::test]
async fn first_id_in_empty_collection_is_one() {
    let loader = sample_loader();
    loader.insert("machines.json", "[]");
    let manager = panel_test_utils::manager_with(loader, DataConfig::default());
    manager.initialize().await.unwrap();

    let pending = manager.create_machine(MachinePatch::new()).unwrap();
    assert_eq!(pending.id(), id(1));
}

#[tokio::test]
async fn update_changes_only_the_given_field() {
    let manager = ready_manager().await;
    let before = manager.get_schedule(id(2)).unwrap();

    manager
        .update_schedule(id(2), SchedulePatch::new().status("Active"))
        .unwrap()
        .commit()
        .await
        .unwrap();

    let after = manager.get_schedule(id(2)).unwrap();
    assert_eq!(after.status, ScheduleStatus::Active);
    assert_eq!(
        Schedule {
            status: before.status.clone(),
            ..after
        },
        before
    );
}

#[tokio::test]
async fn update_of_missing_id_is_not_found() {
    let manager = ready_manager().await;

    let err = manager.update_kpi(id(99), KpiPatch::new().unit("ms")).unwrap_err();
    assert_eq!(
        err,
        DataError::NotFound {
            kind: EntityKind::Kpi,
            id: id(99)
        }
    );
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let manager = ready_manager().await;
    let len = manager.get_schedule_list().unwrap().len();

    let removed = manager.delete_schedule(id(1)).unwrap().commit().await.unwrap();

    assert_eq!(removed.name, "Daily OEE");
    assert!(matches!(
        manager.get_schedule(id(1)),
        Err(DataError::NotFound { .. })
    ));
    assert_eq!(manager.get_schedule_list().unwrap().len(), len - 1);
    assert!(manager.delete_schedule(id(1)).is_err());
}

#[tokio::test]
async fn snapshots_do_not_observe_later_mutations() {
    let manager = ready_manager().await;
    let snapshot = manager.get_machine_list().unwrap();

    manager.delete_machine(id(3)).unwrap().commit().await.unwrap();

    assert_eq!(snapshot.len(), 4);
    assert_eq!(manager.get_machine_list().unwrap().len(), 3);
}

#[tokio::test]
async fn generic_accessors_match_named_ones() {
    let manager = ready_manager().await;

    assert_eq!(manager.list::<Kpi>().unwrap(), manager.get_kpi_list().unwrap());
    assert_eq!(manager.get::<Machine>(id(7)).unwrap(), manager.get_machine(id(7)).unwrap());
}

mod persistence {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn manager(persistence: std::sync::Arc<ScriptedPersistence>) -> panel_data::DataManager {
        let manager = panel_data::DataManager::builder(sample_loader())
            .with_persistence(persistence)
            .with_clock(panel_data::FixedClock(today()))
            .build();
        manager.initialize().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn accepted_commit_sends_one_request() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let kpi = manager
            .create_kpi(KpiPatch::new().name("scrap_rate").unit("%"))
            .unwrap()
            .commit()
            .await
            .unwrap();

        let requests = persistence.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, EntityKind::Kpi);
        assert_eq!(requests[0].operation, Operation::Create);
        assert_eq!(requests[0].entity, serde_json::to_value(&kpi).unwrap());
    }

    #[tokio::test]
    async fn rejected_create_is_removed() {
        let persistence = ScriptedPersistence::new();
        persistence.reject_next("quota exceeded");
        let manager = manager(persistence).await;

        let pending = manager.create_machine(MachinePatch::new().name("Riveting Machine")).unwrap();
        let new_id = pending.id();
        assert!(manager.get_machine(new_id).is_ok());

        let err = pending.commit().await.unwrap_err();
        assert_eq!(
            err,
            DataError::Rejected {
                kind: EntityKind::Machine,
                id: new_id,
                operation: Operation::Create,
                reason: "quota exceeded".into(),
            }
        );
        assert!(manager.get_machine(new_id).is_err());
        assert_eq!(manager.get_machine_list().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn rejected_update_restores_previous_record() {
        let persistence = ScriptedPersistence::new();
        persistence.reject_all("offline");
        let manager = manager(persistence).await;
        let before = manager.get_kpi(id(2)).unwrap();

        let result = manager
            .update_kpi(id(2), KpiPatch::new().unit("min"))
            .unwrap()
            .commit()
            .await;

        assert!(matches!(result, Err(DataError::Rejected { .. })));
        assert_eq!(manager.get_kpi(id(2)).unwrap(), before);
    }

    #[tokio::test]
    async fn rejected_delete_reinserts_at_original_position() {
        let persistence = ScriptedPersistence::new();
        persistence.reject_next("locked");
        let manager = manager(persistence).await;
        let before = manager.get_schedule_list().unwrap();

        let result = manager.delete_schedule(id(2)).unwrap().commit().await;

        assert!(result.is_err());
        assert_eq!(manager.get_schedule_list().unwrap(), before);
    }

    #[tokio::test]
    async fn rejection_keeps_unrelated_mutations() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let doomed = manager.create_kpi(KpiPatch::new().name("doomed")).unwrap();
        let kept = manager.create_kpi(KpiPatch::new().name("kept")).unwrap();
        assert_eq!((doomed.id(), kept.id()), (id(6), id(7)));

        kept.commit().await.unwrap();
        persistence.reject_next("no");
        doomed.commit().await.unwrap_err();

        let names: Vec<String> = manager
            .get_kpi_list()
            .unwrap()
            .iter()
            .map(|k| k.name.clone())
            .collect();
        assert!(names.contains(&"kept".to_string()));
        assert!(!names.contains(&"doomed".to_string()));
    }
}

mod interleaved {
    use super::*;
    use pretty_assertions::assert_eq;
    use panel_data::DataManager;
    use panel_test_utils::init_tracing;
    use std::sync::Arc;

    async fn manager(persistence: Arc<ScriptedPersistence>) -> DataManager {
        init_tracing();
        let manager = DataManager::builder(sample_loader())
            .with_persistence(persistence)
            .with_clock(panel_data::FixedClock(today()))
            .build();
        manager.initialize().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn rejected_create_spares_record_created_after_delete() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let first = manager.create_machine(MachinePatch::new().name("Press 1")).unwrap();
        assert_eq!(first.id(), id(8));
        manager.delete_machine(id(8)).unwrap().commit().await.unwrap();

        let second = manager
            .create_machine(MachinePatch::new().name("Press 2"))
            .unwrap()
            .commit()
            .await
            .unwrap();
        assert_eq!(second.id, id(9));

        persistence.reject_next("duplicate");
        first.commit().await.unwrap_err();

        assert_eq!(manager.get_machine(id(9)).unwrap(), second);
        assert!(manager.get_machine(id(8)).is_err());
    }

    #[tokio::test]
    async fn rejected_update_keeps_later_update_of_same_record() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let renamed = manager
            .update_kpi(id(2), KpiPatch::new().name("offline_time_max"))
            .unwrap();
        let converted = manager.update_kpi(id(2), KpiPatch::new().unit("min")).unwrap();

        converted.commit().await.unwrap();
        persistence.reject_next("stale");
        renamed.commit().await.unwrap_err();

        let kpi = manager.get_kpi(id(2)).unwrap();
        assert_eq!(kpi.name, "offline_time_avg");
        assert_eq!(kpi.unit, "min");
    }

    #[tokio::test]
    async fn rejected_update_leaves_field_overwritten_later() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let first = manager.update_kpi(id(2), KpiPatch::new().unit("min")).unwrap();
        let second = manager.update_kpi(id(2), KpiPatch::new().unit("h")).unwrap();

        second.commit().await.unwrap();
        persistence.reject_next("stale");
        first.commit().await.unwrap_err();

        assert_eq!(manager.get_kpi(id(2)).unwrap().unit, "h");
    }

    #[tokio::test]
    async fn rejected_delete_does_not_duplicate_recreated_id() {
        let persistence = ScriptedPersistence::new();
        let manager = manager(persistence.clone()).await;

        let deleted = manager.delete_kpi(id(5)).unwrap();
        let created = manager.create_kpi(KpiPatch::new()).unwrap().commit().await.unwrap();
        assert_eq!(created.id, id(6));

        persistence.reject_next("locked");
        deleted.commit().await.unwrap_err();

        let ids: Vec<_> = manager.get_kpi_list().unwrap().iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![id(1), id(2), id(3), id(5), id(6)]);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn created_ids_exceed_every_live_id(ops in proptest::collection::vec(proptest::option::of(0u64..12), 0..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let manager = runtime.block_on(ready_manager());

            for op in ops {
                let live: Vec<_> = manager.get_machine_list().unwrap().iter().map(|m| m.id).collect();
                match op {
                    None => {
                        let created = manager.create_machine(MachinePatch::new()).unwrap();
                        prop_assert!(live.iter().all(|existing| created.id() > *existing));
                    }
                    Some(raw) => {
                        let result = manager.delete_machine(id(raw));
                        prop_assert_eq!(result.is_ok(), live.contains(&id(raw)));
                    }
                }
            }

            let mut ids: Vec<_> = manager.get_machine_list().unwrap().iter().map(|m| m.id).collect();
            let len = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
        }
    }
}
