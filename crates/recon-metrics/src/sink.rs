use recon_types::{CheckName, Severity};

use recon_report::Report;

/// Everything the engine needs from a metrics backend after a run
/// finishes (spec.md §4.4). Implementations MUST be infallible from the
/// engine's point of view — a failing or absent sink must never affect run
/// correctness, so there is no `Result` anywhere in this trait.
pub trait MetricsSink: Send + Sync {
    fn record_run(&self, status: Severity, duration_ms: u64);
    fn record_check_duration(&self, check: CheckName, duration_ms: u64);
    fn record_report_gauges(&self, report: &Report);
}

/// Discards everything. Used by tests and any caller that doesn't want a
/// Prometheus exporter running.
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn record_run(&self, _status: Severity, _duration_ms: u64) {}
    fn record_check_duration(&self, _check: CheckName, _duration_ms: u64) {}
    fn record_report_gauges(&self, _report: &Report) {}
}
