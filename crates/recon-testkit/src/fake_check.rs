use std::time::Duration;

use async_trait::async_trait;

use recon_types::{Check, CheckContext, CheckError, CheckName, CheckOutcome, CheckerConfig, Severity};

/// A canned check used by scenario tests to drive the engine without a
/// real datastore. By default it resolves immediately to `Healthy`; the
/// builder methods let a test make it slow, erroring, or panicking, to
/// exercise the engine's deadline and panic-isolation handling.
pub struct FakeCheck {
    name: CheckName,
    outcome: Severity,
    delay: Option<Duration>,
    panics: bool,
    errors: bool,
}

impl FakeCheck {
    pub fn new(name: CheckName, outcome: Severity) -> FakeCheck {
        FakeCheck {
            name,
            outcome,
            delay: None,
            panics: false,
            errors: false,
        }
    }

    pub fn healthy(name: CheckName) -> FakeCheck {
        FakeCheck::new(name, Severity::Healthy)
    }

    pub fn with_delay(mut self, delay: Duration) -> FakeCheck {
        self.delay = Some(delay);
        self
    }

    pub fn panicking(mut self) -> FakeCheck {
        self.panics = true;
        self
    }

    pub fn erroring(mut self) -> FakeCheck {
        self.errors = true;
        self
    }
}

#[async_trait]
impl Check for FakeCheck {
    fn name(&self) -> CheckName {
        self.name
    }

    async fn check(&self, ctx: CheckContext, _cfg: &CheckerConfig) -> Result<CheckOutcome, CheckError> {
        if ctx.is_cancelled() {
            return Err(CheckError::Cancelled);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panics {
            panic!("FakeCheck({}) configured to panic", self.name);
        }
        if self.errors {
            return Err(CheckError::ExecutionFailed(anyhow::anyhow!(
                "FakeCheck({}) configured to error",
                self.name
            )));
        }
        Ok(CheckOutcome::Synthetic { status: self.outcome })
    }
}
