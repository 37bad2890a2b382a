use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::MetadataIssue;

pub struct MetadataRows {
    pub documents_checked: u64,
    pub missing_entity_id_count: u64,
    pub duplicate_count: u64,
    pub empty_count: u64,
    pub issues: Vec<MetadataIssue>,
}

/// Document-shaped metadata store sampled for the three structural defects
/// that matter to the ledger: a document with no `entity_id` back-reference,
/// more than one document claiming the same `entity_id`, or a document
/// whose body is empty (`{}` / null payload).
pub async fn fetch_metadata_issues(pool: &PgPool) -> anyhow::Result<MetadataRows> {
    let documents_checked = count(pool, "select count(*)::bigint as n from metadata_documents")
        .await
        .unwrap_or(0);

    let missing_rows = sqlx::query(
        r#"
        select document_id as entity_id
        from metadata_documents
        where entity_id is null or entity_id = ''
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching metadata documents missing entity_id")?;

    let duplicate_rows = sqlx::query(
        r#"
        select entity_id
        from metadata_documents
        where entity_id is not null and entity_id <> ''
        group by entity_id
        having count(*) > 1
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching duplicate metadata documents")?;

    let empty_rows = sqlx::query(
        r#"
        select entity_id
        from metadata_documents
        where entity_id is not null and entity_id <> ''
          and (body is null or body = '{}'::jsonb)
        "#,
    )
    .fetch_all(pool)
    .await
    .context("fetching empty metadata documents")?;

    let mut issues = Vec::new();
    let missing_entity_id_count = missing_rows.len() as u64;
    for row in &missing_rows {
        issues.push(MetadataIssue {
            entity_id: row.try_get::<String, _>("entity_id").unwrap_or_default(),
            kind: "missing_entity_id".to_string(),
        });
    }
    let duplicate_count = duplicate_rows.len() as u64;
    for row in &duplicate_rows {
        issues.push(MetadataIssue {
            entity_id: row.try_get("entity_id")?,
            kind: "duplicate".to_string(),
        });
    }
    let empty_count = empty_rows.len() as u64;
    for row in &empty_rows {
        issues.push(MetadataIssue {
            entity_id: row.try_get("entity_id")?,
            kind: "empty".to_string(),
        });
    }

    Ok(MetadataRows {
        documents_checked,
        missing_entity_id_count,
        duplicate_count,
        empty_count,
        issues,
    })
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("metadata count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
