use std::sync::Arc;
use std::time::Duration;

use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::{FakeCheck, FakeProbes};
use recon_types::{CheckName, CheckerConfig, Severity};

#[tokio::test]
async fn cold_start_with_three_healthy_checks_is_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(vec![
        Box::new(FakeCheck::healthy(CheckName::Balance)),
        Box::new(FakeCheck::healthy(CheckName::Dlq)),
        Box::new(FakeCheck::healthy(CheckName::Outbox)),
    ])
    .unwrap();
    let store = Arc::new(FileReportStore::new(dir.path(), 0, 0));
    let engine = Engine::new(
        catalog,
        Arc::new(FakeProbes::default()),
        CheckerConfig::default(),
        300,
        Arc::new(NullMetricsSink),
        store.clone(),
    );

    let report = engine.run(Duration::from_secs(5)).await;

    assert_eq!(report.status, Severity::Healthy);
    assert_eq!(report.previous_run_id, None);
    assert!(!report.status_changed);
    assert!(report.delta.is_none());

    let persisted = store.load_recent(10).await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].run_id, report.run_id);
}
