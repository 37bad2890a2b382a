//! recon-report
//!
//! The typed aggregate a reconciliation run produces: per-check results,
//! deltas vs. the previous run, entity counts, overall status, run
//! identity. No I/O, no concurrency — pure data and the pure functions
//! (`default_fill`, `derive_status`, `compute_delta`) that shape it.

mod delta;
mod entity_counts;
mod report;

pub use delta::{compute_delta, Delta};
pub use entity_counts::EntityCounts;
pub use report::{default_fill, derive_status, Report};
