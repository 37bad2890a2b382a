use async_trait::async_trait;
use recon_db::queries::balance::fetch_balance_discrepancies;
use recon_types::{
    BalanceCheckResult, Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig,
    Severity,
};
use sqlx::PgPool;

pub struct BalanceCheck {
    pool: PgPool,
}

impl BalanceCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for BalanceCheck {
    fn name(&self) -> CheckName {
        CheckName::Balance
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let (accounts_checked, discrepancies) = fetch_balance_discrepancies(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let threshold = cfg.discrepancy_threshold.unsigned_abs();

        let mut has_critical_amount = false;
        let mut has_warning_amount = false;
        let mut negative_on_hold_count = 0u64;
        let mut negative_available_count = 0u64;

        for d in &discrepancies {
            let magnitude = (d.recorded_balance - d.computed_from_operations).unsigned_abs();
            if magnitude > 0 {
                if magnitude >= threshold {
                    has_critical_amount = true;
                } else {
                    has_warning_amount = true;
                }
            }
            if d.on_hold < 0 {
                negative_on_hold_count += 1;
            }
            if d.available < 0 && !d.is_liability_account {
                negative_available_count += 1;
            }
        }

        let status = if has_critical_amount || negative_available_count > 0 {
            Severity::Critical
        } else if has_warning_amount || negative_on_hold_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (discrepancy_count, discrepancies) = cfg.sample(discrepancies);

        Ok(CheckOutcome::Balance(BalanceCheckResult {
            status,
            accounts_checked,
            discrepancy_count,
            negative_on_hold_count,
            negative_available_count,
            discrepancies,
        }))
    }
}
