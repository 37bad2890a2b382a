use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use recon_config::Datasources;

/// Handles to the three Postgres-compatible read replicas the checks sample.
/// Each pool is independent: a connectivity failure on one does not prevent
/// checks that only need another from running.
#[derive(Clone)]
pub struct Databases {
    pub onboarding: PgPool,
    pub transaction: PgPool,
    pub metadata: PgPool,
}

impl Databases {
    pub async fn connect(
        datasources: &Datasources,
        max_open_connections: u32,
        max_idle_connections: u32,
    ) -> anyhow::Result<Databases> {
        let onboarding = connect_one(
            &datasources.onboarding_db_url,
            max_open_connections,
            max_idle_connections,
        )
        .await
        .context("connecting to onboarding catalog replica")?;
        let transaction = connect_one(
            &datasources.transaction_db_url,
            max_open_connections,
            max_idle_connections,
        )
        .await
        .context("connecting to transaction ledger replica")?;
        let metadata = connect_one(
            &datasources.metadata_db_url,
            max_open_connections,
            max_idle_connections,
        )
        .await
        .context("connecting to metadata store replica")?;

        Ok(Databases {
            onboarding,
            transaction,
            metadata,
        })
    }
}

async fn connect_one(url: &str, max_open: u32, min_idle: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_open)
        .min_connections(min_idle)
        .connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("{}", recon_config::sanitize(&e.to_string())))
}
