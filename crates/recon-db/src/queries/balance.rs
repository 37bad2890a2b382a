use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::BalanceDiscrepancy;

/// Every (account, asset) balance whose recorded value disagrees with the
/// signed sum of its operations, or that shows a negative on-hold/available
/// figure. Severity classification (threshold comparison, liability-account
/// exemption) is the caller's job — this only surfaces candidates.
pub async fn fetch_balance_discrepancies(
    pool: &PgPool,
) -> anyhow::Result<(u64, Vec<BalanceDiscrepancy>)> {
    let rows = sqlx::query(
        r#"
        select
          b.account_id,
          b.asset_code,
          b.balance as recorded_balance,
          coalesce(sum(o.amount), 0)::bigint as computed_from_operations,
          b.on_hold,
          b.available,
          a.is_liability as is_liability_account
        from balances b
        left join operations o
          on o.account_id = b.account_id and o.asset_code = b.asset_code
        join accounts a on a.account_id = b.account_id
        group by b.account_id, b.asset_code, b.balance, b.on_hold, b.available, a.is_liability
        having b.balance <> coalesce(sum(o.amount), 0)::bigint
            or b.on_hold < 0
            or b.available < 0
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching balance discrepancies")?;

    let mut discrepancies = Vec::with_capacity(rows.len());
    for row in &rows {
        discrepancies.push(BalanceDiscrepancy {
            account_id: row.try_get("account_id")?,
            asset_code: row.try_get("asset_code")?,
            recorded_balance: row.try_get("recorded_balance")?,
            computed_from_operations: row.try_get("computed_from_operations")?,
            on_hold: row.try_get("on_hold")?,
            available: row.try_get("available")?,
            is_liability_account: row.try_get("is_liability_account")?,
        });
    }

    let accounts_checked = count_accounts(pool).await.unwrap_or(0);
    Ok((accounts_checked, discrepancies))
}

async fn count_accounts(pool: &PgPool) -> anyhow::Result<u64> {
    let row = sqlx::query("select count(*)::bigint as n from balances")
        .fetch_one(pool)
        .await
        .context("counting balances")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
