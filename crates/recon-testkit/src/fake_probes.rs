use async_trait::async_trait;

use recon_db::SettlementPartition;
use recon_engine::Probes;
use recon_report::EntityCounts;

/// A fixed population snapshot, so scenario tests can assert on
/// `EntityCounts`/settlement numbers without a live Postgres connection.
#[derive(Clone, Copy, Default)]
pub struct FakeProbes {
    pub counts: EntityCounts,
    pub settlement: SettlementPartition,
}

#[async_trait]
impl Probes for FakeProbes {
    async fn entity_counts(&self) -> EntityCounts {
        self.counts
    }

    async fn settlement_partition(&self, _settlement_wait_secs: u64) -> SettlementPartition {
        self.settlement
    }
}
