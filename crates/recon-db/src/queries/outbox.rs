use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::OutboxBacklogEntry;

pub struct OutboxRows {
    pub pending: u64,
    pub processing: u64,
    pub stale_processing: u64,
    pub failed: u64,
    pub entries: Vec<OutboxBacklogEntry>,
}

/// Backlog state of the metadata-update outbox: anything not yet
/// successfully delivered, bucketed by state, plus how long "processing"
/// entries have sat there (a stuck worker shows up as stale-processing).
pub async fn fetch_outbox_backlog(
    pool: &PgPool,
    stale_threshold_secs: i64,
) -> anyhow::Result<OutboxRows> {
    let pending = count(pool, "select count(*)::bigint as n from outbox where state = 'pending'")
        .await
        .unwrap_or(0);
    let processing = count(
        pool,
        "select count(*)::bigint as n from outbox where state = 'processing'",
    )
    .await
    .unwrap_or(0);
    let failed = count(pool, "select count(*)::bigint as n from outbox where state = 'failed'")
        .await
        .unwrap_or(0);

    let stale_processing = {
        let row = sqlx::query(
            r#"
            select count(*)::bigint as n
            from outbox
            where state = 'processing'
              and updated_at <= now() - ($1 || ' seconds')::interval
            "#,
        )
        .bind(stale_threshold_secs)
        .fetch_one(pool)
        .await
        .context("counting stale-processing outbox entries")?;
        let n: i64 = row.try_get("n")?;
        n.max(0) as u64
    };

    let rows = sqlx::query(
        r#"
        select
          message_id,
          state,
          extract(epoch from (now() - created_at))::bigint as age_secs
        from outbox
        where state in ('pending', 'processing', 'failed')
        order by created_at asc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching outbox backlog entries")?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        let age_secs: i64 = row.try_get("age_secs")?;
        entries.push(OutboxBacklogEntry {
            message_id: row.try_get("message_id")?,
            state: row.try_get("state")?,
            age_secs: age_secs.max(0) as u64,
        });
    }

    Ok(OutboxRows {
        pending,
        processing,
        stale_processing,
        failed,
        entries,
    })
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("outbox count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
