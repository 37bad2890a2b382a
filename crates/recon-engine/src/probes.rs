use async_trait::async_trait;

use recon_db::{fetch_entity_counts, fetch_settlement_partition, Databases, SettlementPartition};
use recon_report::EntityCounts;

/// The cheap, sequential population snapshot a run takes before fanning
/// out checks (spec.md §4.2 step 4): entity counts across both replicas,
/// and the settled/unsettled settlement partition. Abstracted behind a
/// trait so `recon-engine`'s orchestration logic can be exercised in tests
/// without a live Postgres connection (see `recon-testkit::FakeProbes`).
#[async_trait]
pub trait Probes: Send + Sync {
    async fn entity_counts(&self) -> EntityCounts;
    async fn settlement_partition(&self, settlement_wait_secs: u64) -> SettlementPartition;
}

#[async_trait]
impl Probes for Databases {
    async fn entity_counts(&self) -> EntityCounts {
        fetch_entity_counts(&self.onboarding, &self.transaction).await
    }

    /// Individual failures are logged and leave the partition at zero; per
    /// spec.md §4.2 step 4 they never abort the run.
    async fn settlement_partition(&self, settlement_wait_secs: u64) -> SettlementPartition {
        fetch_settlement_partition(&self.transaction, settlement_wait_secs as i64)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "settlement partition probe failed; counters left at zero");
                SettlementPartition::default()
            })
    }
}
