use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use recon_types::DlqEntry;

/// Dead-lettered outbox messages for the metadata-update pipeline.
pub async fn fetch_dlq_entries(pool: &PgPool) -> anyhow::Result<Vec<DlqEntry>> {
    let rows = sqlx::query(
        r#"
        select message_id, topic, failed_at, reason
        from outbox_dlq
        order by failed_at desc
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching dlq entries")?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let failed_at: DateTime<Utc> = row.try_get("failed_at")?;
        out.push(DlqEntry {
            message_id: row.try_get("message_id")?,
            topic: row.try_get("topic")?,
            failed_at,
            reason: row.try_get("reason")?,
        });
    }
    Ok(out)
}
