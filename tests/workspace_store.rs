use serde_json::json;
use smart_ads::workspace::{
    BusinessProfile, FileWorkspaceStore, MemoryWorkspaceStore, Snapshot, SnapshotKind,
    WorkspaceStore,
};
use smart_ads::SmartAdsError;
use tempfile::tempdir;

fn snapshot(user: &str, kind: SnapshotKind, label: &str) -> Snapshot {
    Snapshot::new(user, kind, label, json!({ "label": label }), json!({}))
}

#[tokio::test]
async fn snapshots_are_listed_newest_first_and_filtered_by_kind() {
    let store = MemoryWorkspaceStore::new(10);
    store
        .add_snapshot(snapshot("ana", SnapshotKind::BudgetPlan, "first"))
        .await
        .expect("add");
    store
        .add_snapshot(snapshot("ana", SnapshotKind::MetricsAnalysis, "second"))
        .await
        .expect("add");
    store
        .add_snapshot(snapshot("ana", SnapshotKind::BudgetPlan, "third"))
        .await
        .expect("add");
    store
        .add_snapshot(snapshot("luis", SnapshotKind::BudgetPlan, "other user"))
        .await
        .expect("add");

    let all = store.list_snapshots("ana", None).await.expect("list");
    let labels: Vec<&str> = all.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["third", "second", "first"]);

    let budgets = store
        .list_snapshots("ana", Some(SnapshotKind::BudgetPlan))
        .await
        .expect("list");
    assert_eq!(budgets.len(), 2);
    assert!(budgets.iter().all(|s| s.kind == SnapshotKind::BudgetPlan));
}

#[tokio::test]
async fn snapshot_cap_applies_per_user() {
    let store = MemoryWorkspaceStore::new(2);
    for label in ["a", "b", "c"] {
        store
            .add_snapshot(snapshot("ana", SnapshotKind::ClientReport, label))
            .await
            .expect("add");
    }
    store
        .add_snapshot(snapshot("luis", SnapshotKind::ClientReport, "x"))
        .await
        .expect("add");

    let ana = store.list_snapshots("ana", None).await.expect("list");
    let labels: Vec<&str> = ana.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["c", "b"]);
    assert_eq!(store.list_snapshots("luis", None).await.expect("list").len(), 1);
}

#[tokio::test]
async fn users_can_only_delete_their_own_snapshots() {
    let store = MemoryWorkspaceStore::new(10);
    let saved = store
        .add_snapshot(snapshot("ana", SnapshotKind::CampaignStructure, "tree"))
        .await
        .expect("add");

    assert!(!store.delete_snapshot("luis", &saved.id).await.expect("delete"));
    assert_eq!(store.list_snapshots("ana", None).await.expect("list").len(), 1);

    assert!(store.delete_snapshot("ana", &saved.id).await.expect("delete"));
    assert!(!store.delete_snapshot("ana", &saved.id).await.expect("delete"));
    assert!(store.list_snapshots("ana", None).await.expect("list").is_empty());
}

#[tokio::test]
async fn profile_and_progress_round_through_the_store() {
    let store = MemoryWorkspaceStore::new(10);
    assert_eq!(store.profile("ana").await.expect("profile"), None);

    let profile = BusinessProfile {
        niche: "Inmobiliaria".to_string(),
        bottleneck: "Pocos leads calificados".to_string(),
        ..BusinessProfile::default()
    };
    store.save_profile("ana", profile.clone()).await.expect("save");
    assert_eq!(store.profile("ana").await.expect("profile"), Some(profile));

    store.set_lesson("ana", "m1-l1", true).await.expect("lesson");
    let progress = store.set_lesson("ana", "m1-l2", true).await.expect("lesson");
    assert_eq!(progress.completed_count(), 2);

    let progress = store.set_lesson("ana", "m1-l1", false).await.expect("lesson");
    assert_eq!(progress.completed_count(), 1);
    assert!(!progress.completed.contains_key("m1-l1"));
    assert_eq!(store.progress("luis").await.expect("progress").completed_count(), 0);
}

#[tokio::test]
async fn file_store_survives_reload() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("workspace.json");

    let store = FileWorkspaceStore::load(path.clone(), 10).await.expect("load");
    let saved = store
        .add_snapshot(snapshot("ana", SnapshotKind::MetricsAnalysis, "march"))
        .await
        .expect("add");
    store
        .save_profile(
            "ana",
            BusinessProfile {
                offer: "Mentoría 1:1".to_string(),
                ..BusinessProfile::default()
            },
        )
        .await
        .expect("save");
    store.set_lesson("ana", "m2-l3", true).await.expect("lesson");
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reloaded = FileWorkspaceStore::load(path.clone(), 10).await.expect("reload");
    let snapshots = reloaded.list_snapshots("ana", None).await.expect("list");
    assert_eq!(snapshots, vec![saved]);
    assert_eq!(
        reloaded.profile("ana").await.expect("profile").map(|p| p.offer),
        Some("Mentoría 1:1".to_string())
    );
    assert_eq!(reloaded.progress("ana").await.expect("progress").completed_count(), 1);
}

#[tokio::test]
async fn empty_workspace_file_loads_as_default() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("workspace.json");
    std::fs::write(&path, "  \n").expect("write");

    let store = FileWorkspaceStore::load(path, 5).await.expect("load");
    assert!(store.list_snapshots("ana", None).await.expect("list").is_empty());
}

#[tokio::test]
async fn corrupt_workspace_file_is_a_storage_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("workspace.json");
    std::fs::write(&path, "{ not json").expect("write");

    assert!(matches!(
        FileWorkspaceStore::load(path, 5).await,
        Err(SmartAdsError::Storage(_))
    ));
}

#[test]
fn snapshot_kinds_parse_and_serialize_in_camel_case() {
    assert_eq!(SnapshotKind::from_str("budget"), Some(SnapshotKind::BudgetPlan));
    assert_eq!(SnapshotKind::from_str("clientReport"), Some(SnapshotKind::ClientReport));
    assert_eq!(SnapshotKind::from_str("unknown"), None);

    let value = serde_json::to_value(snapshot("ana", SnapshotKind::MetricsAnalysis, "x")).expect("json");
    assert_eq!(value["kind"], "metricsAnalysis");
    assert_eq!(value["userId"], "ana");
    assert!(value["id"].as_str().is_some_and(|id| id.starts_with("snap_")));
}

#[tokio::test]
async fn failed_writes_leave_the_store_unchanged() {
    let dir = tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker");
    let store = FileWorkspaceStore::load(blocker.join("workspace.json"), 10)
        .await
        .expect("load");

    let added = store
        .add_snapshot(snapshot("ana", SnapshotKind::BudgetPlan, "lost"))
        .await;
    assert!(matches!(added, Err(SmartAdsError::Storage(_))));
    assert!(store.list_snapshots("ana", None).await.expect("list").is_empty());

    let saved = store
        .save_profile(
            "ana",
            BusinessProfile {
                niche: "Retail".to_string(),
                ..BusinessProfile::default()
            },
        )
        .await;
    assert!(saved.is_err());
    assert_eq!(store.profile("ana").await.expect("profile"), None);

    assert!(store.set_lesson("ana", "m1-l1", true).await.is_err());
    assert_eq!(store.progress("ana").await.expect("progress").completed_count(), 0);
}
