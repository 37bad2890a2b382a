use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use recon_engine::Engine;

/// Runs the engine on a fixed interval, starting with an immediate run on
/// boot (spec.md §4.8). Enforces "at most one run in flight": a tick that
/// lands while the previous run is still going is logged and skipped, not
/// queued, and the previous run is never cancelled by a late tick.
///
/// The manual-trigger HTTP route does *not* go through this gate — it is
/// its own call path, bounded by its own rate limit and deadline.
pub struct Scheduler {
    engine: Arc<Engine>,
    interval: Duration,
    run_deadline: Duration,
    single_flight: Mutex<()>,
}

impl Scheduler {
    pub fn new(engine: Arc<Engine>, interval: Duration, run_deadline: Duration) -> Scheduler {
        Scheduler {
            engine,
            interval,
            run_deadline,
            single_flight: Mutex::new(()),
        }
    }

    /// Runs until `shutdown` is cancelled. The run in flight at shutdown
    /// time is left to finish on its own schedule (it already carries its
    /// own deadline); no new run is started after the signal arrives.
    pub async fn run_forever(&self, shutdown: CancellationToken) {
        self.tick().await;

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.interval,
            self.interval,
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("scheduler shutting down, no further runs will be started");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    async fn tick(&self) {
        let Ok(_guard) = self.single_flight.try_lock() else {
            tracing::info!("reconciliation run already in flight, skipping this tick");
            return;
        };
        let report = self.engine.run(self.run_deadline).await;
        tracing::info!(run_id = %report.run_id, status = %report.status, "scheduled reconciliation run completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use recon_engine::Catalog;
    use recon_metrics::NullMetricsSink;
    use recon_store::FileReportStore;
    use recon_testkit::{FakeCheck, FakeProbes};
    use recon_types::{CheckName, CheckerConfig};

    fn build_engine(dir: &std::path::Path) -> Arc<Engine> {
        let catalog = Catalog::new(vec![Box::new(FakeCheck::healthy(CheckName::Balance))]).unwrap();
        Arc::new(Engine::new(
            catalog,
            Arc::new(FakeProbes::default()),
            CheckerConfig::default(),
            300,
            Arc::new(NullMetricsSink),
            Arc::new(FileReportStore::new(dir, 0, 0)),
        ))
    }

    #[tokio::test]
    async fn immediate_run_happens_before_the_first_tick() {
        let dir = tempfile::tempdir().unwrap();
        let engine = build_engine(dir.path());
        let scheduler = Scheduler::new(engine.clone(), Duration::from_secs(3600), Duration::from_secs(5));

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        scheduler.run_forever(shutdown).await;

        assert!(engine.last_report().await.is_some());
    }

    #[tokio::test]
    async fn a_tick_arriving_mid_run_is_skipped_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let engine = build_engine(dir.path());
        let scheduler = Arc::new(Scheduler::new(engine.clone(), Duration::from_secs(3600), Duration::from_secs(5)));

        let held = scheduler.single_flight.try_lock().unwrap();
        scheduler.tick().await;
        drop(held);

        // Only the held lock prevented a run; no report was produced while busy.
        assert!(engine.last_report().await.is_none());
    }
}
