use async_trait::async_trait;
use recon_db::queries::crm_alias::fetch_crm_alias_issues;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, CrmAliasCheckResult,
    Severity,
};
use sqlx::PgPool;

use crate::rate::rate_bps;

const CRITICAL_RATE_BPS: u64 = 100;

pub struct CrmAliasCheck {
    pool: PgPool,
}

impl CrmAliasCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for CrmAliasCheck {
    fn name(&self) -> CheckName {
        CheckName::CrmAlias
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let (aliases_checked, issues) = fetch_crm_alias_issues(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let missing_count = issues.len() as u64;
        let missing_rate_bps = rate_bps(missing_count, aliases_checked);

        let status = if missing_rate_bps > CRITICAL_RATE_BPS {
            Severity::Critical
        } else if missing_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, issues) = cfg.sample(issues);

        Ok(CheckOutcome::CrmAlias(CrmAliasCheckResult {
            status,
            aliases_checked,
            missing_count,
            missing_rate_bps,
            issues,
        }))
    }
}
