use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use recon_types::{CheckName, CheckOutcome, Severity};

use recon_report::Report;

use crate::sink::MetricsSink;

/// Wraps the global `metrics` recorder with the gauge/counter/histogram
/// names the engine emits (spec.md §4.4). Installing more than one of these
/// per process is a programming error — `install` panics-free but returns
/// the error, matching `init_tracing`'s one-shot-at-startup shape.
pub struct PrometheusMetricsSink {
    handle: PrometheusHandle,
}

impl PrometheusMetricsSink {
    pub fn install() -> anyhow::Result<PrometheusMetricsSink> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("failed to install prometheus recorder: {e}"))?;
        Ok(PrometheusMetricsSink { handle })
    }

    /// Rendered text exposition, served by the status surface's metrics
    /// endpoint.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn record_run(&self, status: Severity, duration_ms: u64) {
        counter!("runs_total", "status" => status.to_string()).increment(1);
        histogram!("run_duration_ms").record(duration_ms as f64);
    }

    fn record_check_duration(&self, check: CheckName, duration_ms: u64) {
        histogram!("check_duration_ms", "check" => check.as_str()).record(duration_ms as f64);
    }

    fn record_report_gauges(&self, report: &Report) {
        for (check, outcome) in &report.checks {
            match outcome {
                CheckOutcome::Balance(r) => {
                    gauge!("balance_discrepancies").set(r.discrepancy_count as f64);
                }
                CheckOutcome::DoubleEntry(r) => {
                    gauge!("double_entry_unbalanced").set(r.imbalanced_count as f64);
                }
                CheckOutcome::OrphanTransactions(r) => {
                    gauge!("orphan_transactions")
                        .set((r.partially_orphaned_count + r.fully_orphaned_count) as f64);
                }
                CheckOutcome::Outbox(r) => {
                    gauge!("outbox_pending").set(r.pending as f64);
                    gauge!("outbox_failed").set(r.failed as f64);
                }
                CheckOutcome::Dlq(r) => {
                    gauge!("dlq_total").set(r.total as f64);
                }
                CheckOutcome::RedisBalance(r) => {
                    gauge!("redis_mismatch_total").set(r.mismatch_count as f64);
                }
                CheckOutcome::Sync(_)
                | CheckOutcome::Referential(_)
                | CheckOutcome::Metadata(_)
                | CheckOutcome::CrossDb(_)
                | CheckOutcome::CrmAlias(_)
                | CheckOutcome::Defaulted { .. }
                | CheckOutcome::Synthetic { .. } => {
                    let _ = check; // no dedicated gauge for this check kind
                }
            }
        }
        gauge!("last_run_timestamp").set(report.timestamp.timestamp() as f64);
    }
}
