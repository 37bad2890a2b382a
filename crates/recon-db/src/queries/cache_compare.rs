use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// DB side of a balance that has a cache counterpart somewhere in Redis.
/// `sync` and `redis_balance` both start from this row; they differ only in
/// what they compare it against (version+staleness vs. raw value).
pub struct BalanceVersionRow {
    pub account_id: String,
    pub asset_code: String,
    pub db_version: i64,
    pub db_value: i64,
    pub updated_at: DateTime<Utc>,
}

pub async fn fetch_balance_versions(pool: &PgPool) -> anyhow::Result<Vec<BalanceVersionRow>> {
    let rows = sqlx::query(
        r#"
        select account_id, asset_code, version as db_version, balance as db_value, updated_at
        from balances
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching balance versions for cache comparison")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(BalanceVersionRow {
            account_id: row.try_get("account_id")?,
            asset_code: row.try_get("asset_code")?,
            db_version: row.try_get("db_version")?,
            db_value: row.try_get("db_value")?,
            updated_at: row.try_get("updated_at")?,
        });
    }
    Ok(out)
}
