use std::sync::Arc;
use std::time::Duration;

use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::{FakeCheck, FakeProbes};
use recon_types::{CheckName, CheckerConfig, Severity};

#[tokio::test]
async fn a_panicking_check_yields_an_error_slot_without_crashing_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(vec![
        Box::new(FakeCheck::healthy(CheckName::Balance).panicking()),
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

    assert_eq!(report.status, Severity::Error);
    assert_eq!(
        report.check(CheckName::Balance).unwrap().status(),
        Severity::Error
    );
    assert_eq!(
        report.check(CheckName::Dlq).unwrap().status(),
        Severity::Healthy
    );
    assert_eq!(
        report.check(CheckName::Outbox).unwrap().status(),
        Severity::Healthy
    );
}
