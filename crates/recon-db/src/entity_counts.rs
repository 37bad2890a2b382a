use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_report::EntityCounts;

/// Cheap population snapshot across both replicas. Individual count
/// failures are logged by the caller and left at zero; they never abort
/// the run (spec.md §4.2 step 4).
pub async fn fetch_entity_counts(onboarding: &PgPool, transaction: &PgPool) -> EntityCounts {
    let mut counts = EntityCounts::default();

    counts.organizations = count(onboarding, "organizations").await.unwrap_or(0);
    counts.ledgers = count(onboarding, "ledgers").await.unwrap_or(0);
    counts.assets = count(onboarding, "assets").await.unwrap_or(0);
    counts.accounts = count(onboarding, "accounts").await.unwrap_or(0);
    counts.portfolios = count(onboarding, "portfolios").await.unwrap_or(0);
    counts.segments = count(onboarding, "segments").await.unwrap_or(0);

    counts.transactions = count(transaction, "transactions").await.unwrap_or(0);
    counts.operations = count(transaction, "operations").await.unwrap_or(0);
    counts.balances = count(transaction, "balances").await.unwrap_or(0);
    counts.asset_rates = count(transaction, "asset_rates").await.unwrap_or(0);

    counts
}

async fn count(pool: &PgPool, table: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(&format!("select count(*)::bigint as n from {table}"))
        .fetch_one(pool)
        .await
        .with_context(|| format!("counting {table}"))?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementPartition {
    pub settled: u64,
    pub unsettled: u64,
}

/// Splits transactions accepted before `settlement_wait_secs` ago into
/// settled (fully posted) vs. unsettled (still within the grace window or
/// genuinely stuck). This is a cheap count, not the orphan-transactions
/// check itself.
pub async fn fetch_settlement_partition(
    transaction: &PgPool,
    settlement_wait_secs: i64,
) -> anyhow::Result<SettlementPartition> {
    let row = sqlx::query(
        r#"
        select
          count(*) filter (where settled_at is not null)::bigint as settled,
          count(*) filter (
            where settled_at is null
              and created_at <= now() - ($1 || ' seconds')::interval
          )::bigint as unsettled
        from transactions
        "#,
    )
    .bind(settlement_wait_secs)
    .fetch_one(transaction)
    .await
    .context("fetching settlement partition")?;

    let settled: i64 = row.try_get("settled")?;
    let unsettled: i64 = row.try_get("unsettled")?;

    Ok(SettlementPartition {
        settled: settled.max(0) as u64,
        unsettled: unsettled.max(0) as u64,
    })
}
