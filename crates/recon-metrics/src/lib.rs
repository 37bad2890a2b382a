//! recon-metrics
//!
//! Counters/histograms/gauges for runs, per-check durations, and current
//! discrepancy levels (spec.md §4.4). Best-effort by contract: nothing in
//! this crate's public surface can fail a run.

mod prometheus;
mod sink;

pub use prometheus::PrometheusMetricsSink;
pub use sink::{MetricsSink, NullMetricsSink};
