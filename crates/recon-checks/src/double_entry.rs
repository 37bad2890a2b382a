use async_trait::async_trait;
use recon_db::queries::double_entry::fetch_double_entry_rows;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, DoubleEntryCheckResult,
    Severity,
};
use sqlx::PgPool;

pub struct DoubleEntryCheck {
    pool: PgPool,
}

impl DoubleEntryCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for DoubleEntryCheck {
    fn name(&self) -> CheckName {
        CheckName::DoubleEntry
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let rows = fetch_double_entry_rows(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let status = if !rows.imbalanced.is_empty() {
            Severity::Critical
        } else if rows.transactions_without_operations > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (imbalanced_count, imbalanced) = cfg.sample(rows.imbalanced);

        Ok(CheckOutcome::DoubleEntry(DoubleEntryCheckResult {
            status,
            transactions_checked: rows.transactions_checked,
            transactions_without_operations: rows.transactions_without_operations,
            imbalanced_count,
            imbalanced,
        }))
    }
}
