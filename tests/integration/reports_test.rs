//! Report store tests against real files.

use lms_insight::error::InsightError;
use lms_insight::persistence::{NewReport, ReportChanges, ReportStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn report(name: &str, sql: &str) -> NewReport {
    NewReport {
        name: name.to_string(),
        description: None,
        sql: sql.to_string(),
    }
}

#[tokio::test]
async fn test_missing_file_is_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportStore::new(dir.path().join("absent.json"));

    assert!(store.list().await.unwrap().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_concurrent_creates_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ReportStore::new(dir.path().join("reports.json")));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create(report(&format!("R{i}"), &format!("SELECT {i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reports = store.list().await.unwrap();
    assert_eq!(reports.len(), 16);

    let mut ids: Vec<_> = reports.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

#[tokio::test]
async fn test_reads_hand_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.json");
    std::fs::write(
        &path,
        r#"[
  {
    "id": "legacy-1",
    "name": "Active users",
    "sql": "SELECT id FROM mdl_user",
    "createdAt": "2024-02-01T10:00:00Z",
    "updatedAt": "2024-02-01T10:00:00Z"
  }
]"#,
    )
    .unwrap();

    let store = ReportStore::new(&path);
    let loaded = store.get("legacy-1").await.unwrap();
    assert_eq!(loaded.name, "Active users");
    assert_eq!(loaded.description, "");

    let updated = store
        .update(
            "legacy-1",
            ReportChanges {
                sql: Some("SELECT id, username FROM mdl_user".to_string()),
                ..ReportChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.sql, "SELECT id, username FROM mdl_user");
    assert!(updated.updated_at > updated.created_at);
}

#[tokio::test]
async fn test_rejected_update_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.json");
    let store = ReportStore::new(&path);
    let created = store.create(report("R", "SELECT 1")).await.unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let result = store
        .update(
            &created.id,
            ReportChanges {
                name: Some("renamed".to_string()),
                sql: Some("TRUNCATE mdl_log".to_string()),
                ..ReportChanges::default()
            },
        )
        .await;

    assert!(matches!(result, Err(InsightError::Validation(_))));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}
