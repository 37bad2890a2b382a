use async_trait::async_trait;
use chrono::Utc;
use recon_cache::BalanceCache;
use recon_db::queries::cache_compare::fetch_balance_versions;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, Severity,
    SyncCheckResult, SyncMismatch,
};
use sqlx::PgPool;

pub struct SyncCheck {
    pool: PgPool,
    cache: BalanceCache,
}

impl SyncCheck {
    pub fn new(pool: PgPool, cache: BalanceCache) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl Check for SyncCheck {
    fn name(&self) -> CheckName {
        CheckName::Sync
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let rows = fetch_balance_versions(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let keys: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.account_id.clone(), r.asset_code.clone()))
            .collect();
        let cached = self
            .cache
            .get_many(&keys)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let now = Utc::now();
        let warn_secs = cfg.stale_threshold_secs;
        let critical_secs = cfg.stale_threshold_secs.saturating_mul(2);

        let mut mismatches = Vec::new();
        let mut version_divergence_count = 0u64;
        let mut stale_count = 0u64;

        for row in &rows {
            let staleness_secs = (now - row.updated_at).num_seconds().max(0) as u64;
            let cache_entry = cached.get(&(row.account_id.clone(), row.asset_code.clone()));
            let cache_version = cache_entry.map(|c| c.version).unwrap_or(0);
            let diverged = cache_entry.is_none() || cache_version != row.db_version;

            if diverged {
                version_divergence_count += 1;
            }
            if staleness_secs >= warn_secs {
                stale_count += 1;
            }

            if diverged || staleness_secs >= warn_secs {
                mismatches.push(SyncMismatch {
                    account_id: row.account_id.clone(),
                    asset_code: row.asset_code.clone(),
                    db_version: row.db_version,
                    cache_version,
                    staleness_secs,
                });
            }
        }

        let status = if version_divergence_count > 0
            || mismatches.iter().any(|m| m.staleness_secs > critical_secs)
        {
            Severity::Critical
        } else if stale_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let balances_checked = rows.len() as u64;
        let (_, mismatches) = cfg.sample(mismatches);

        Ok(CheckOutcome::Sync(SyncCheckResult {
            status,
            balances_checked,
            version_divergence_count,
            stale_count,
            mismatches,
        }))
    }
}
