use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::CrossDbMissingReference;

/// Ledger-side references that must resolve against the onboarding catalog:
/// every transaction's `ledger_id` and `asset_code` must exist there. Unlike
/// `referential`, the two sides live in different databases, so this can't
/// be expressed as a single join and instead does a set-difference per
/// reference kind.
pub async fn fetch_cross_db_missing(
    onboarding: &PgPool,
    transaction: &PgPool,
) -> anyhow::Result<(u64, Vec<CrossDbMissingReference>)> {
    let ledger_ids: Vec<String> = sqlx::query("select ledger_id from ledgers")
        .fetch_all(onboarding)
        .await
        .context("fetching ledger ids from catalog")?
        .iter()
        .map(|r| r.try_get::<String, _>("ledger_id"))
        .collect::<Result<_, _>>()?;

    let asset_codes: Vec<String> = sqlx::query("select code from assets")
        .fetch_all(onboarding)
        .await
        .context("fetching asset codes from catalog")?
        .iter()
        .map(|r| r.try_get::<String, _>("code"))
        .collect::<Result<_, _>>()?;

    let mut missing = Vec::new();

    let missing_ledgers = sqlx::query(
        r#"
        select distinct t.transaction_id, t.ledger_id
        from transactions t
        where t.ledger_id <> all($1)
        "#,
    )
    .bind(&ledger_ids)
    .fetch_all(transaction)
    .await
    .context("finding transactions referencing unknown ledgers")?;
    for row in &missing_ledgers {
        missing.push(CrossDbMissingReference {
            ledger_entity: "transaction".to_string(),
            ledger_entity_id: row.try_get("transaction_id")?,
            catalog_reference: format!("ledger:{}", row.try_get::<String, _>("ledger_id")?),
        });
    }

    let missing_assets = sqlx::query(
        r#"
        select distinct o.operation_id, o.asset_code
        from operations o
        where o.asset_code <> all($1)
        "#,
    )
    .bind(&asset_codes)
    .fetch_all(transaction)
    .await
    .context("finding operations referencing unknown assets")?;
    for row in &missing_assets {
        missing.push(CrossDbMissingReference {
            ledger_entity: "operation".to_string(),
            ledger_entity_id: row.try_get("operation_id")?,
            catalog_reference: format!("asset:{}", row.try_get::<String, _>("asset_code")?),
        });
    }

    let references_checked = count(transaction, "select count(*)::bigint as n from transactions")
        .await
        .unwrap_or(0)
        + count(transaction, "select count(*)::bigint as n from operations")
            .await
            .unwrap_or(0);

    Ok((references_checked, missing))
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("cross_db count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
