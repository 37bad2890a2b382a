use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use recon_metrics::MetricsSink;
use recon_report::{compute_delta, default_fill, derive_status, Report};
use recon_store::FileReportStore;
use recon_types::{Check, CheckContext, CheckName, CheckOutcome, CheckerConfig, Severity};

use crate::catalog::Catalog;
use crate::probes::Probes;
use crate::state::RunState;

/// Orchestrates one reconciliation run end to end (spec.md §4.2): fan-out,
/// drain, default-fill, status derivation, delta, publish, metrics,
/// persistence. Holds the handles every check needs and the sole piece of
/// shared mutable state inside the engine, the last published report.
pub struct Engine {
    catalog: Catalog,
    probes: Arc<dyn Probes>,
    checker_config: CheckerConfig,
    settlement_wait_secs: u64,
    metrics: Arc<dyn MetricsSink>,
    store: Arc<FileReportStore>,
    state: RunState,
}

impl Engine {
    pub fn new(
        catalog: Catalog,
        probes: Arc<dyn Probes>,
        checker_config: CheckerConfig,
        settlement_wait_secs: u64,
        metrics: Arc<dyn MetricsSink>,
        store: Arc<FileReportStore>,
    ) -> Engine {
        Engine {
            catalog,
            probes,
            checker_config,
            settlement_wait_secs,
            metrics,
            store,
            state: RunState::new(),
        }
    }

    /// The last published report, if a run has ever completed in this
    /// process (not loaded from the store — that's the daemon's job on
    /// cold start).
    pub async fn last_report(&self) -> Option<Arc<Report>> {
        self.state.snapshot().await
    }

    /// Run every registered check to completion (or until `deadline`
    /// elapses) and publish the resulting report. Never returns an error:
    /// per spec.md §7 the only conditions that could make `run` fail are
    /// programmer errors, and an engine built via `Catalog::new` cannot hit
    /// them at this point, so every failure mode downgrades to a per-check
    /// `Error` slot instead.
    pub async fn run(&self, deadline: Duration) -> Arc<Report> {
        let run_id = Uuid::new_v4();
        let timestamp = Utc::now();
        let span = tracing::info_span!("reconciliation.run", run_id = %run_id);

        self.run_inner(run_id, timestamp, deadline).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, timestamp: chrono::DateTime<Utc>, deadline: Duration) -> Arc<Report> {
        let started = Instant::now();
        let previous = self.state.snapshot().await;
        let previous_outcomes: Option<Arc<BTreeMap<String, CheckOutcome>>> =
            previous.as_ref().map(|r| Arc::new(r.checks.clone()));

        let settlement = self.probes.settlement_partition(self.settlement_wait_secs).await;
        let entity_counts = self.probes.entity_counts().await;

        let cancellation = CancellationToken::new();
        let deadline_instant = Instant::now() + deadline;
        let deadline_guard = {
            let token = cancellation.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline_instant).await;
                token.cancel();
            })
        };

        let (checks, durations) = self
            .fan_out_and_drain(cancellation.clone(), previous_outcomes, deadline_instant)
            .await;
        deadline_guard.abort();

        let checks = default_fill(checks, &self.catalog.registered_names());
        let status = derive_status(&checks);
        let delta = compute_delta(checks.values(), previous.as_ref().map(|r| r.checks.values()));

        let previous_run_id = previous.as_ref().map(|r| r.run_id);
        let previous_status = previous.as_ref().map(|r| r.status);
        let status_changed = previous_status.is_some_and(|p| p != status);

        let report = Arc::new(Report {
            run_id,
            timestamp,
            duration: format!("{:.3?}", started.elapsed()),
            status,
            previous_run_id,
            previous_status,
            status_changed,
            entity_counts,
            settled_transactions: settlement.settled,
            unsettled_transactions: settlement.unsettled,
            checks,
            check_durations_ms: durations,
            delta,
        });

        self.state.publish(report.clone()).await;

        self.metrics
            .record_run(report.status, started.elapsed().as_millis() as u64);
        for name in CheckName::ALL {
            if let Some(ms) = report.check_durations_ms.get(name.as_str()) {
                self.metrics.record_check_duration(name, *ms);
            }
        }
        self.metrics.record_report_gauges(&report);

        if let Err(e) = self.store.save(&report).await {
            tracing::warn!(error = %e, "failed to persist reconciliation report");
        }

        report
    }

    /// Spawns one task per registered check, then drains them. A check
    /// that doesn't resolve before `deadline_instant` is aborted and
    /// treated as `Error`; a check whose task panics is likewise recovered
    /// to an `Error` slot and never aborts a sibling (spec.md §5 "panic
    /// isolation").
    async fn fan_out_and_drain(
        &self,
        cancellation: CancellationToken,
        previous_outcomes: Option<Arc<BTreeMap<String, CheckOutcome>>>,
        deadline_instant: Instant,
    ) -> (BTreeMap<String, CheckOutcome>, BTreeMap<String, u64>) {
        let mut handles: Vec<(CheckName, JoinHandle<(Result<CheckOutcome, recon_types::CheckError>, Duration)>)> =
            Vec::with_capacity(self.catalog.checks().len());

        for check in self.catalog.checks() {
            let name = check.name();
            let check: Arc<dyn Check> = check.clone();
            let ctx = CheckContext::with_previous(cancellation.clone(), previous_outcomes.clone());
            let cfg = self.checker_config;
            let handle = tokio::spawn(async move {
                let start = Instant::now();
                let result = check.check(ctx, &cfg).await;
                (result, start.elapsed())
            });
            handles.push((name, handle));
        }

        let mut outcomes = BTreeMap::new();
        let mut durations = BTreeMap::new();

        for (name, mut handle) in handles {
            tokio::select! {
                biased;
                joined = &mut handle => {
                    match joined {
                        Ok((Ok(outcome), elapsed)) => {
                            durations.insert(name.as_str().to_string(), elapsed.as_millis() as u64);
                            outcomes.insert(name.as_str().to_string(), outcome);
                        }
                        Ok((Err(err), elapsed)) => {
                            tracing::warn!(check = %name, error = %err, "check returned an error");
                            durations.insert(name.as_str().to_string(), elapsed.as_millis() as u64);
                            outcomes.insert(
                                name.as_str().to_string(),
                                CheckOutcome::Defaulted { status: Severity::Error },
                            );
                        }
                        Err(join_err) => {
                            tracing::error!(check = %name, error = %join_err, "check task panicked");
                            outcomes.insert(
                                name.as_str().to_string(),
                                CheckOutcome::Defaulted { status: Severity::Error },
                            );
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline_instant) => {
                    handle.abort();
                    tracing::warn!(check = %name, "check did not complete before the run deadline");
                    outcomes.insert(
                        name.as_str().to_string(),
                        CheckOutcome::Defaulted { status: Severity::Error },
                    );
                }
            }
        }

        (outcomes, durations)
    }
}
