use async_trait::async_trait;
use recon_db::queries::orphan::fetch_orphan_transactions;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig,
    OrphanTransactionsCheckResult, Severity,
};
use sqlx::PgPool;

pub struct OrphanTransactionsCheck {
    pool: PgPool,
}

impl OrphanTransactionsCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for OrphanTransactionsCheck {
    fn name(&self) -> CheckName {
        CheckName::OrphanTransactions
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let (transactions_checked, orphans) =
            fetch_orphan_transactions(&self.pool, cfg.stale_threshold_secs as i64)
                .await
                .map_err(CheckError::ExecutionFailed)?;

        let fully_orphaned_count = orphans.iter().filter(|o| o.operations_present == 0).count() as u64;
        let partially_orphaned_count = orphans.len() as u64 - fully_orphaned_count;

        let status = if fully_orphaned_count > 0 {
            Severity::Critical
        } else if partially_orphaned_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, orphans) = cfg.sample(orphans);

        Ok(CheckOutcome::OrphanTransactions(OrphanTransactionsCheckResult {
            status,
            transactions_checked,
            partially_orphaned_count,
            fully_orphaned_count,
            orphans,
        }))
    }
}
