use std::sync::Arc;
use std::time::Duration;

use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::{FakeCheck, FakeProbes};
use recon_types::{CheckName, CheckOutcome, CheckerConfig, Severity};

#[tokio::test]
async fn one_critical_check_makes_the_whole_report_critical() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(vec![
        Box::new(FakeCheck::new(CheckName::Balance, Severity::Critical)),
        Box::new(FakeCheck::healthy(CheckName::Dlq)),
        Box::new(FakeCheck::healthy(CheckName::Outbox)),
    ])
    .unwrap();
    let engine = Engine::new(
        catalog,
        Arc::new(FakeProbes::default()),
        CheckerConfig::default(),
        300,
        Arc::new(NullMetricsSink),
        Arc::new(FileReportStore::new(dir.path(), 0, 0)),
    );

    let report = engine.run(Duration::from_secs(5)).await;

    assert_eq!(report.status, Severity::Critical);
    let balance = report.check(CheckName::Balance).unwrap();
    assert_eq!(balance.status(), Severity::Critical);
    assert!(matches!(balance, CheckOutcome::Synthetic { .. }));
}
