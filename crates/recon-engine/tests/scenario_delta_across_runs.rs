use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::FakeProbes;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, OutboxCheckResult,
    Severity,
};

/// An outbox check whose `pending` count grows by one on every call, so a
/// test can assert `Delta = current - previous` across two runs of the
/// same engine.
struct GrowingOutboxCheck {
    pending: AtomicU64,
}

#[async_trait]
impl Check for GrowingOutboxCheck {
    fn name(&self) -> CheckName {
        CheckName::Outbox
    }

    async fn check(&self, _ctx: CheckContext, _cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        let pending = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckOutcome::Outbox(OutboxCheckResult {
            status: Severity::Healthy,
            pending,
            processing: 0,
            stale_processing: 0,
            failed: 0,
            entries: Vec::new(),
        }))
    }
}

#[tokio::test]
async fn delta_reflects_current_minus_previous_across_two_runs() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new(vec![Box::new(GrowingOutboxCheck {
        pending: AtomicU64::new(0),
    })])
    .unwrap();
    let engine = Engine::new(
        catalog,
        Arc::new(FakeProbes::default()),
        CheckerConfig::default(),
        300,
        Arc::new(NullMetricsSink),
        Arc::new(FileReportStore::new(dir.path(), 0, 0)),
    );

    let first = engine.run(Duration::from_secs(5)).await;
    assert!(first.delta.is_none());

    let second = engine.run(Duration::from_secs(5)).await;
    let delta = second.delta.expect("delta present once a previous run exists");
    assert_eq!(delta.outbox_pending, 1);
    assert_eq!(second.previous_run_id, Some(first.run_id));
}
