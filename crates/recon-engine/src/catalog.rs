use std::sync::Arc;

use recon_types::{Check, CheckName, EngineError};

/// The closed, startup-known set of registered checks (spec.md §1 "the
/// check set is closed and known at startup"). Uniqueness of names is
/// enforced here, once, at construction — a duplicate is a programmer
/// error, not a runtime condition.
pub struct Catalog {
    checks: Vec<Arc<dyn Check>>,
}

impl Catalog {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Result<Catalog, EngineError> {
        let mut seen = std::collections::BTreeSet::new();
        for check in &checks {
            let name = check.name();
            if !seen.insert(name) {
                return Err(EngineError::DuplicateCheck(name.as_str().to_string()));
            }
        }
        Ok(Catalog {
            checks: checks.into_iter().map(Arc::from).collect(),
        })
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    pub fn registered_names(&self) -> Vec<CheckName> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn is_registered(&self, name: CheckName) -> bool {
        self.checks.iter().any(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recon_types::{CheckContext, CheckError, CheckOutcome, CheckerConfig, Severity};

    struct Stub(CheckName);

    #[async_trait]
    impl Check for Stub {
        fn name(&self) -> CheckName {
            self.0
        }
        async fn check(
            &self,
            _ctx: CheckContext,
            _cfg: &CheckerConfig,
        ) -> Result<CheckOutcome, CheckError> {
            Ok(CheckOutcome::Synthetic {
                status: Severity::Healthy,
            })
        }
    }

    #[test]
    fn rejects_duplicate_names() {
        let checks: Vec<Box<dyn Check>> =
            vec![Box::new(Stub(CheckName::Balance)), Box::new(Stub(CheckName::Balance))];
        let err = Catalog::new(checks).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateCheck(_)));
    }

    #[test]
    fn accepts_unique_names() {
        let checks: Vec<Box<dyn Check>> =
            vec![Box::new(Stub(CheckName::Balance)), Box::new(Stub(CheckName::Dlq))];
        let catalog = Catalog::new(checks).unwrap();
        assert!(catalog.is_registered(CheckName::Balance));
        assert!(!catalog.is_registered(CheckName::Outbox));
    }
}
