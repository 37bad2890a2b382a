use anyhow::Context;
use sqlx::{PgPool, Row};

use recon_types::ReferentialOrphan;

struct Relation {
    entity: &'static str,
    missing_reference: &'static str,
    sql: &'static str,
}

/// Intra-store foreign-key relationships checked for dangling references.
/// Cross-database references (ledger → catalog) are `cross_db`'s job, not
/// this one.
const ONBOARDING_RELATIONS: &[Relation] = &[
    Relation {
        entity: "account",
        missing_reference: "ledger",
        sql: r#"
            select a.account_id as entity_id
            from accounts a
            left join ledgers l on l.ledger_id = a.ledger_id
            where l.ledger_id is null
        "#,
    },
    Relation {
        entity: "account",
        missing_reference: "portfolio",
        sql: r#"
            select a.account_id as entity_id
            from accounts a
            left join portfolios p on p.portfolio_id = a.portfolio_id
            where a.portfolio_id is not null and p.portfolio_id is null
        "#,
    },
    Relation {
        entity: "ledger",
        missing_reference: "organization",
        sql: r#"
            select l.ledger_id as entity_id
            from ledgers l
            left join organizations org on org.organization_id = l.organization_id
            where org.organization_id is null
        "#,
    },
];

const TRANSACTION_RELATIONS: &[Relation] = &[Relation {
    entity: "operation",
    missing_reference: "balance",
    sql: r#"
        select o.operation_id as entity_id
        from operations o
        left join balances b on b.account_id = o.account_id and b.asset_code = o.asset_code
        where b.account_id is null
    "#,
}];

pub async fn fetch_referential_orphans(
    onboarding: &PgPool,
    transaction: &PgPool,
) -> anyhow::Result<(u64, Vec<ReferentialOrphan>)> {
    let mut orphans = Vec::new();
    for relation in ONBOARDING_RELATIONS {
        orphans.extend(run_relation(onboarding, relation).await?);
    }
    for relation in TRANSACTION_RELATIONS {
        orphans.extend(run_relation(transaction, relation).await?);
    }

    let entities_checked = count(onboarding, "select count(*)::bigint as n from accounts")
        .await
        .unwrap_or(0)
        + count(onboarding, "select count(*)::bigint as n from ledgers")
            .await
            .unwrap_or(0)
        + count(transaction, "select count(*)::bigint as n from operations")
            .await
            .unwrap_or(0);

    Ok((entities_checked, orphans))
}

async fn run_relation(pool: &PgPool, relation: &Relation) -> anyhow::Result<Vec<ReferentialOrphan>> {
    let rows = sqlx::query(relation.sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("fetching orphans for {}", relation.entity))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(ReferentialOrphan {
            entity: relation.entity.to_string(),
            entity_id: row.try_get("entity_id")?,
            missing_reference: relation.missing_reference.to_string(),
        });
    }
    Ok(out)
}

async fn count(pool: &PgPool, sql: &str) -> anyhow::Result<u64> {
    let row = sqlx::query(sql)
        .fetch_one(pool)
        .await
        .context("referential count query failed")?;
    let n: i64 = row.try_get("n")?;
    Ok(n.max(0) as u64)
}
