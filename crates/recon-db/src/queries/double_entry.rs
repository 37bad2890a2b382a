use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::ImbalancedTransaction;

pub struct DoubleEntryRows {
    pub transactions_checked: u64,
    pub transactions_without_operations: u64,
    pub imbalanced: Vec<ImbalancedTransaction>,
}

/// Per posted (transaction, asset) pair: Σcredits − Σdebits. Non-zero means
/// the transaction violates double-entry balance; zero operations at all
/// is tracked separately since it is a weaker signal (WARNING, not
/// necessarily CRITICAL).
pub async fn fetch_double_entry_rows(pool: &PgPool) -> anyhow::Result<DoubleEntryRows> {
    let transactions_checked = count(pool, "select count(*)::bigint as n from transactions where status = 'posted'")
        .await
        .unwrap_or(0);

    let transactions_without_operations = count(
        pool,
        r#"
        select count(*)::bigint as n
        from transactions t
        where t.status = 'posted'
          and not exists (select 1 from operations o where o.transaction_id = t.transaction_id)
        "#,
    )
    .await
    .unwrap_or(0);

    let rows = sqlx::query(
        r#"
        select
          t.transaction_id,
          o.asset_code,
          coalesce(sum(o.amount) filter (where o.amount < 0), 0)::bigint as sum_debits,
          coalesce(sum(o.amount) filter (where o.amount > 0), 0)::bigint as sum_credits,
          coalesce(sum(o.amount), 0)::bigint as imbalance
        from transactions t
        join operations o on o.transaction_id = t.transaction_id
        where t.status = 'posted'
        group by t.transaction_id, o.asset_code
        having coalesce(sum(o.amount), 0)::bigint <> 0
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching imbalanced transactions")?;

    let mut imbalanced = Vec::with_capacity(rows.len());
    for row in &rows {
        imbalanced.push(ImbalancedTransaction {
            transaction_id: row.try_get("transaction_id")?,
            asset_code: row.try_get("asset_code")?,
            sum_debits: row.try_get("sum_debits")?,
            sum_credits: row.try_get("sum_credits")?,
            imbalance: row.try_get("imbalance")?,
        });
    }

    Ok(DoubleEntryRows {
        transactions_checked,
        transactions_without_operations,
        imbalanced,
    })
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("double_entry count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
