use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::CrmAliasIssue;

/// CRM-facing alias records (human-friendly handles for accounts/ledgers)
/// whose target no longer resolves. An alias naming neither a valid
/// account nor a valid ledger is a dangling pointer an external CRM
/// integration would silently mis-route.
pub async fn fetch_crm_alias_issues(pool: &PgPool) -> anyhow::Result<(u64, Vec<CrmAliasIssue>)> {
    let rows = sqlx::query(
        r#"
        select ca.alias_id, ca.account_id, ca.ledger_id
        from crm_aliases ca
        left join accounts a on a.account_id = ca.account_id
        left join ledgers l on l.ledger_id = ca.ledger_id
        where (ca.account_id is not null and a.account_id is null)
           or (ca.ledger_id is not null and l.ledger_id is null)
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching crm alias issues")?;

    let mut issues = Vec::with_capacity(rows.len());
    for row in &rows {
        issues.push(CrmAliasIssue {
            alias_id: row.try_get("alias_id")?,
            account_id: row.try_get("account_id")?,
            ledger_id: row.try_get("ledger_id")?,
        });
    }

    let aliases_checked = count(pool, "select count(*)::bigint as n from crm_aliases")
        .await
        .unwrap_or(0);
    Ok((aliases_checked, issues))
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("crm_alias count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
