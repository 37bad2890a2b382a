use std::sync::Arc;
use std::time::Duration;

use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::{FakeCheck, FakeProbes};
use recon_types::{CheckName, CheckerConfig, Severity};

#[tokio::test]
async fn a_run_whose_checks_outlive_the_deadline_publishes_all_error() {
    let dir = tempfile::tempdir().unwrap();
    let slow = Duration::from_secs(1);
    let catalog = Catalog::new(vec![
        Box::new(FakeCheck::healthy(CheckName::Balance).with_delay(slow)),
        Box::new(FakeCheck::healthy(CheckName::Dlq).with_delay(slow)),
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

    let start = tokio::time::Instant::now();
    let report = engine.run(Duration::from_millis(100)).await;
    let elapsed = start.elapsed();

    assert_eq!(report.status, Severity::Error);
    assert_eq!(report.check(CheckName::Balance).unwrap().status(), Severity::Error);
    assert_eq!(report.check(CheckName::Dlq).unwrap().status(), Severity::Error);
    // The run must return close to the deadline, not wait out the full 1s sleep.
    assert!(elapsed < slow, "run took {elapsed:?}, expected well under {slow:?}");
}
