use async_trait::async_trait;
use recon_cache::BalanceCache;
use recon_db::queries::cache_compare::fetch_balance_versions;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, RedisBalanceCheckResult,
    RedisValueMismatch, Severity,
};
use sqlx::PgPool;

pub struct RedisBalanceCheck {
    pool: PgPool,
    cache: BalanceCache,
}

impl RedisBalanceCheck {
    pub fn new(pool: PgPool, cache: BalanceCache) -> Self {
        Self { pool, cache }
    }
}

#[async_trait]
impl Check for RedisBalanceCheck {
    fn name(&self) -> CheckName {
        CheckName::RedisBalance
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

        let mut mismatches = Vec::new();
        let mut value_mismatch_count = 0u64;

        for row in &rows {
            let entry = cached.get(&(row.account_id.clone(), row.asset_code.clone()));
            let cache_value = entry.map(|e| e.value);

            match cache_value {
                Some(v) if v == row.db_value => continue,
                Some(_) => value_mismatch_count += 1,
                // Cache miss is a mismatch (the check can't confirm agreement) but
                // never a value mismatch on its own.
                None => {}
            }

            mismatches.push(RedisValueMismatch {
                account_id: row.account_id.clone(),
                asset_code: row.asset_code.clone(),
                db_value: row.db_value,
                cache_value,
            });
        }

        let status = if value_mismatch_count > 0 {
            Severity::Critical
        } else if !mismatches.is_empty() {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let balances_sampled = rows.len() as u64;
        let (mismatch_count, mismatches) = cfg.sample(mismatches);

        Ok(CheckOutcome::RedisBalance(RedisBalanceCheckResult {
            status,
            balances_sampled,
            mismatch_count,
            value_mismatch_count,
            mismatches,
        }))
    }
}
