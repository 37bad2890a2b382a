use async_trait::async_trait;
use recon_db::queries::metadata::fetch_metadata_issues;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, MetadataCheckResult,
    Severity,
};
use sqlx::PgPool;

use crate::rate::rate_bps;

const CRITICAL_RATE_BPS: u64 = 100;

pub struct MetadataCheck {
    pool: PgPool,
}

impl MetadataCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for MetadataCheck {
    fn name(&self) -> CheckName {
        CheckName::Metadata
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let rows = fetch_metadata_issues(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let missing_rate_bps = rate_bps(rows.missing_entity_id_count, rows.documents_checked);
        let any_issue =
            rows.missing_entity_id_count > 0 || rows.duplicate_count > 0 || rows.empty_count > 0;

        let status = if missing_rate_bps > CRITICAL_RATE_BPS {
            Severity::Critical
        } else if any_issue {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, issues) = cfg.sample(rows.issues);

        Ok(CheckOutcome::Metadata(MetadataCheckResult {
            status,
            documents_checked: rows.documents_checked,
            missing_entity_id_count: rows.missing_entity_id_count,
            duplicate_count: rows.duplicate_count,
            empty_count: rows.empty_count,
            missing_rate_bps,
            issues,
        }))
    }
}
