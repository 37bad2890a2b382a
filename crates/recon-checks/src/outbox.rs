use async_trait::async_trait;
use recon_db::queries::outbox::fetch_outbox_backlog;
use recon_types::{
    Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, OutboxCheckResult,
    Severity,
};
use sqlx::PgPool;

pub struct OutboxCheck {
    pool: PgPool,
}

impl OutboxCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Check for OutboxCheck {
    fn name(&self) -> CheckName {
        CheckName::Outbox
    }

    async fn check(&self, ctx: CheckContext, cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }

        let rows = fetch_outbox_backlog(&self.pool, cfg.stale_threshold_secs as i64)
            .await
            .map_err(CheckError::ExecutionFailed)?;

        let previous_failed = match ctx.previous_outcome(CheckName::Outbox) {
            Some(CheckOutcome::Outbox(prev)) => Some(prev.failed),
            _ => None,
        };
        let failed_rising = previous_failed.is_some_and(|prev| rows.failed > prev);

        let backlog = rows.pending + rows.processing + rows.failed;

        let status = if rows.stale_processing > 0 || failed_rising {
            Severity::Critical
        } else if backlog > 0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };

        let (_, entries) = cfg.sample(rows.entries);

        Ok(CheckOutcome::Outbox(OutboxCheckResult {
            status,
            pending: rows.pending,
            processing: rows.processing,
            stale_processing: rows.stale_processing,
            failed: rows.failed,
            entries,
        }))
    }
}
