use async_trait::async_trait;
use recon_db::queries::referential::fetch_referential_orphans;
use recon_db::Databases;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, ReferentialCheckResult,
    Severity,
};

use crate::rate::rate_bps;

/// Orphan rate above which a referential-integrity breach is escalated
/// from WARNING to CRITICAL: 100 basis points (1%) of the checked
/// population.
const CRITICAL_RATE_BPS: u64 = 100;

pub struct ReferentialCheck {
    databases: Databases,
}

impl ReferentialCheck {
    pub fn new(databases: Databases) -> Self {
        Self { databases }
    }
}

#[async_trait]
impl Check for ReferentialCheck {
    fn name(&self) -> CheckName {
        CheckName::Referential
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let (entities_checked, orphans) =
            fetch_referential_orphans(&self.databases.onboarding, &self.databases.transaction)
                .await
                .map_err(CheckError::ExecutionFailed)?;

        let orphan_count = orphans.len() as u64;
        let orphan_rate_bps = rate_bps(orphan_count, entities_checked);

        let status = if orphan_rate_bps > CRITICAL_RATE_BPS {
            Severity::Critical
        } else if orphan_count > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, orphans) = cfg.sample(orphans);

        Ok(CheckOutcome::Referential(ReferentialCheckResult {
            status,
            entities_checked,
            orphan_count,
            orphan_rate_bps,
            orphans,
        }))
    }
}
