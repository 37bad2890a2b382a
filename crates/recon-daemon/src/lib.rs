//! recon-daemon
//!
//! The process that wires every other crate together: loads `Config`,
//! connects the databases and cache, builds the check catalog, runs the
//! engine on a schedule, and exposes a small HTTP status surface. Mirrors
//! the teacher's own split of `main.rs` (bootstrap only) from `state.rs`
//! (shared handles) and `routes.rs` (handlers), with scheduling policy in
//! its own `scheduler` module.

mod api_types;
mod ratelimit;
mod routes;
mod scheduler;
mod state;

pub use ratelimit::RateLimiter;
pub use routes::build_router;
pub use scheduler::Scheduler;
pub use state::AppState;
