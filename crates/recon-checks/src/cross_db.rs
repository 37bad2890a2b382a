use async_trait::async_trait;
use recon_db::queries::cross_db::fetch_cross_db_missing;
use recon_db::Databases;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, CrossDbCheckResult,
    Severity,
};

use crate::rate::rate_bps;

const CRITICAL_RATE_BPS: u64 = 100;

pub struct CrossDbCheck {
    databases: Databases,
}

impl CrossDbCheck {
    pub fn new(databases: Databases) -> Self {
        Self { databases }
    }
}

#[async_trait]
impl Check for CrossDbCheck {
    fn name(&self) -> CheckName {
        CheckName::CrossDb
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let (references_checked, missing) =
            fetch_cross_db_missing(&self.databases.onboarding, &self.databases.transaction)
                .await
                .map_err(CheckError::ExecutionFailed)?;

        let missing_count = missing.len() as u64;
        let missing_rate_bps = rate_bps(missing_count, references_checked);

        let status = if missing_rate_bps > CRITICAL_RATE_BPS {
            Severity::Critical
        } else if missing_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, missing) = cfg.sample(missing);

        Ok(CheckOutcome::CrossDb(CrossDbCheckResult {
            status,
            references_checked,
            missing_count,
            missing_rate_bps,
            missing,
        }))
    }
}
