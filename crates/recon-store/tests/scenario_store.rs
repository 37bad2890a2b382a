use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use recon_report::{EntityCounts, Report};
use recon_store::FileReportStore;
use uuid::Uuid;

fn report_at(timestamp: DateTime<Utc>) -> Report {
    Report {
        run_id: Uuid::new_v4(),
        timestamp,
        duration: "0.001s".to_string(),
        status: recon_types::Severity::Healthy,
        previous_run_id: None,
        previous_status: None,
        status_changed: false,
        entity_counts: EntityCounts::default(),
        settled_transactions: 0,
        unsettled_transactions: 0,
        checks: BTreeMap::new(),
        check_durations_ms: BTreeMap::new(),
        delta: None,
    }
}

#[tokio::test]
async fn ordering_survives_mtime_tamper() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileReportStore::new(dir.path(), 0, 0);

    let ts_a = DateTime::parse_from_rfc3339("2026-07-27T21:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let ts_b = DateTime::parse_from_rfc3339("2026-07-27T20:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let report_a = report_at(ts_a);
    let report_b = report_at(ts_b);

    store.save(&report_a).await.unwrap();
    store.save(&report_b).await.unwrap();

    // Tamper: make A's file mtime look older than B's, even though A's
    // filename timestamp (authoritative) is later.
    let mut dir_entries = std::fs::read_dir(dir.path()).unwrap();
    while let Some(entry) = dir_entries.next() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        if name.contains(&report_a.run_id.to_string()) {
            filetime::set_file_mtime(entry.path(), filetime::FileTime::from_unix_time(0, 0)).ok();
        }
    }

    let recent = store.load_recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].run_id, report_a.run_id);
    assert_eq!(recent[1].run_id, report_b.run_id);
}

#[tokio::test]
async fn retention_keeps_only_max_files_newest_by_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileReportStore::new(dir.path(), 3, 0);

    let base = DateTime::parse_from_rfc3339("2026-07-27T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    let mut run_ids = Vec::new();
    for i in 0..5 {
        let report = report_at(base + chrono::Duration::minutes(i));
        run_ids.push(report.run_id);
        store.save(&report).await.unwrap();
    }

    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.ends_with(".json"))
        .collect();
    assert_eq!(remaining.len(), 3);

    // The 3 newest (last 3 of the 5 saved) must survive.
    for kept_run_id in &run_ids[2..] {
        assert!(remaining.iter().any(|n| n.contains(&kept_run_id.to_string())));
    }
}

#[tokio::test]
async fn load_recent_tolerates_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileReportStore::new(dir.path(), 0, 0);

    let good = report_at(Utc::now());
    store.save(&good).await.unwrap();

    std::fs::write(dir.path().join("reconciliation_20260101_000000_garbage.json"), "{not json").unwrap();

    let recent = store.load_recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].run_id, good.run_id);
}
