//! recon-checks
//!
//! Concrete implementations of every check in the catalog (spec.md §4.1).
//! Each struct owns only the database/cache handles it needs and is
//! otherwise stateless; severity classification lives here, next to the
//! query that produced the candidate rows, per check.

mod balance;
mod cross_db;
mod crm_alias;
mod dlq;
mod double_entry;
mod metadata;
mod orphan_transactions;
mod outbox;
mod rate;
mod redis_balance;
mod referential;
mod sync;

pub use balance::BalanceCheck;
pub use cross_db::CrossDbCheck;
pub use crm_alias::CrmAliasCheck;
pub use dlq::DlqCheck;
pub use double_entry::DoubleEntryCheck;
pub use metadata::MetadataCheck;
pub use orphan_transactions::OrphanTransactionsCheck;
pub use outbox::OutboxCheck;
pub use redis_balance::RedisBalanceCheck;
pub use referential::ReferentialCheck;
pub use sync::SyncCheck;

use recon_cache::BalanceCache;
use recon_db::Databases;
use recon_types::Check;

/// Builds one instance of every check in the catalog, wired to the given
/// database/cache handles. The order here has no significance — the
/// engine fans these out concurrently and in unspecified order.
pub fn build_catalog(databases: &Databases, cache: &BalanceCache) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(BalanceCheck::new(databases.transaction.clone())),
        Box::new(DoubleEntryCheck::new(databases.transaction.clone())),
        Box::new(OrphanTransactionsCheck::new(databases.transaction.clone())),
        Box::new(ReferentialCheck::new(databases.clone())),
        Box::new(SyncCheck::new(databases.transaction.clone(), cache.clone())),
        Box::new(RedisBalanceCheck::new(databases.transaction.clone(), cache.clone())),
        Box::new(DlqCheck::new(databases.metadata.clone())),
        Box::new(OutboxCheck::new(databases.metadata.clone())),
        Box::new(MetadataCheck::new(databases.metadata.clone())),
        Box::new(CrossDbCheck::new(databases.clone())),
        Box::new(CrmAliasCheck::new(databases.onboarding.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::rate::rate_bps;

    #[test]
    fn rate_bps_is_zero_over_empty_population() {
        assert_eq!(rate_bps(5, 0), 0);
    }

    #[test]
    fn rate_bps_computes_basis_points() {
        assert_eq!(rate_bps(1, 100), 100);
        assert_eq!(rate_bps(1, 10_000), 1);
    }
}
