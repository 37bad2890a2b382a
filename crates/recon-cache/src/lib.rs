//! recon-cache
//!
//! Read-only access to the Redis balance cache that sits in front of the
//! transaction ledger. The `sync` and `redis_balance` checks both read
//! through this handle; neither ever writes to it.

use anyhow::Context;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// One cached balance entry as Redis actually stores it: a version counter
/// (bumped on every DB write) alongside the value itself, so `sync` can
/// detect version drift and `redis_balance` can detect value drift
/// independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedBalance {
    pub version: i64,
    pub value: i64,
}

#[derive(Clone)]
pub struct BalanceCache {
    conn: ConnectionManager,
}

fn cache_key(account_id: &str, asset_code: &str) -> String {
    format!("balance:{account_id}:{asset_code}")
}

impl BalanceCache {
    pub async fn connect(url: &str) -> anyhow::Result<BalanceCache> {
        let client = redis::Client::open(url)
            .map_err(|e| anyhow::anyhow!("{}", recon_config::sanitize(&e.to_string())))
            .context("building redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| anyhow::anyhow!("{}", recon_config::sanitize(&e.to_string())))
            .context("connecting to redis balance cache")?;
        Ok(BalanceCache { conn })
    }

    /// Fetches one cached entry. `Ok(None)` means the key is simply absent
    /// (cache miss, not an error); checks decide for themselves whether a
    /// miss is itself a discrepancy.
    pub async fn get(&self, account_id: &str, asset_code: &str) -> anyhow::Result<Option<CachedBalance>> {
        let mut conn = self.conn.clone();
        let key = cache_key(account_id, asset_code);
        let fields: Vec<Option<i64>> = conn
            .hget(&key, &["version", "value"])
            .await
            .context("reading balance cache entry")?;

        match (fields.first().copied().flatten(), fields.get(1).copied().flatten()) {
            (Some(version), Some(value)) => Ok(Some(CachedBalance { version, value })),
            _ => Ok(None),
        }
    }

    /// Batch form used when sampling many balances per run; misses are
    /// simply absent from the returned map rather than erroring the whole
    /// batch.
    pub async fn get_many(
        &self,
        keys: &[(String, String)],
    ) -> anyhow::Result<std::collections::HashMap<(String, String), CachedBalance>> {
        let mut out = std::collections::HashMap::with_capacity(keys.len());
        for (account_id, asset_code) in keys {
            if let Some(entry) = self.get(account_id, asset_code).await? {
                out.insert((account_id.clone(), asset_code.clone()), entry);
            }
        }
        Ok(out)
    }
}
