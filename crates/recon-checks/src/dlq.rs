use async_trait::async_trait;
use recon_db::queries::dlq::fetch_dlq_entries;
use recon_types::{Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, DlqCheckResult, Severity};
use sqlx::PgPool;

/// Dead-letter volume above which a backlog is treated as a burst rather
/// than ordinary noise.
const BURST_THRESHOLD: u64 = 50;

pub struct DlqCheck {
    pool: PgPool,
}

impl DlqCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for DlqCheck {
    fn name(&self) -> CheckName {
        CheckName::Dlq
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let entries = fetch_dlq_entries(&self.pool)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let status = if entries.len() as u64 > BURST_THRESHOLD {
            Severity::Critical
        } else if !entries.is_empty() {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (total, entries) = cfg.sample(entries);

        Ok(CheckOutcome::Dlq(DlqCheckResult {
            status,
            total,
            entries,
        }))
    }
}
