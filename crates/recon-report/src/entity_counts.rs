use serde::{Deserialize, Serialize};

/// Population snapshot across both stores, taken cheaply at the start of a
/// run and fed both into the report and into checks that need population
/// sizes (e.g. to compute a rate threshold).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct EntityCounts {
    pub organizations: u64,
    pub ledgers: u64,
    pub assets: u64,
    pub accounts: u64,
    pub portfolios: u64,
    pub segments: u64,
    pub transactions: u64,
    pub operations: u64,
    pub balances: u64,
    pub asset_rates: u64,
}
