//! recon-testkit
//!
//! In-memory fixtures for exercising `recon-engine` without a live
//! Postgres/Redis connection: canned checks (`FakeCheck`) and a canned
//! population snapshot (`FakeProbes`). Mirrors the teacher's own
//! testkit crate — fixtures live in their own crate so every other
//! crate's `tests/` directory can depend on them as a dev-dependency.

mod fake_check;
mod fake_probes;

pub use fake_check::FakeCheck;
pub use fake_probes::FakeProbes;
