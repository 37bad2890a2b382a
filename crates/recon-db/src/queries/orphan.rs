use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use recon_types::OrphanTransaction;

/// Posted transactions with zero (fully orphaned) or fewer-than-expected
/// (partially orphaned) operations, restricted to those accepted at least
/// `settlement_wait_secs` ago — anything younger is still within its grace
/// window and not yet a discrepancy.
pub async fn fetch_orphan_transactions(
    pool: &PgPool,
    settlement_wait_secs: i64,
) -> anyhow::Result<(u64, Vec<OrphanTransaction>)> {
    let rows = sqlx::query(
        r#"
        select
          t.transaction_id,
          t.expected_operations,
          t.accepted_at,
          coalesce(op.operations_present, 0)::bigint as operations_present
        from transactions t
        left join (
          select transaction_id, count(*)::bigint as operations_present
          from operations
          group by transaction_id
        ) op on op.transaction_id = t.transaction_id
        where t.status = 'posted'
          and t.accepted_at <= now() - ($1 || ' seconds')::interval
          and coalesce(op.operations_present, 0) < t.expected_operations
        "#,
    )
    .bind(settlement_wait_secs)
    .fetch_all(pool)
    .await
    .context("fetching orphan transactions")?;

    let mut orphans = Vec::with_capacity(rows.len());
    for row in &rows {
        let operations_present: i64 = row.try_get("operations_present")?;
        let operations_expected: i32 = row.try_get("expected_operations")?;
        let accepted_at: DateTime<Utc> = row.try_get("accepted_at")?;
        orphans.push(OrphanTransaction {
            transaction_id: row.try_get("transaction_id")?,
            operations_present: operations_present.max(0) as u64,
            operations_expected: operations_expected.max(0) as u64,
            accepted_at,
        });
    }

    let transactions_checked = count_posted(pool).await.unwrap_or(0);
    Ok((transactions_checked, orphans))
}

async fn count_posted(pool: &PgPool) -> anyhow::Result<u64> {
    let row = sqlx::query("select count(*)::bigint as n from transactions where status = 'posted'")
        .fetch_one(pool)
        .await
        .context("counting posted transactions")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
