//! recon-db
//!
//! Postgres access for the onboarding catalog and transaction ledger read
//! replicas (plus the metadata store, which happens to also be Postgres
//! here). Every query function returns the *full* set of offending rows it
//! found; truncating to `CheckerConfig.max_results` and assigning a
//! severity are `recon-checks`'s job, not this crate's.

mod entity_counts;
mod pool;
pub mod queries;

pub use entity_counts::{fetch_entity_counts, fetch_settlement_partition, SettlementPartition};
pub use pool::Databases;
