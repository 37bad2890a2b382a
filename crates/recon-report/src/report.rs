use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recon_types::{CheckName, CheckOutcome, Severity};

use crate::delta::Delta;
use crate::entity_counts::EntityCounts;

/// Immutable once published (spec.md §3). Every field here is set exactly
/// once, at the end of a run, by `recon-engine`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock run duration, rendered the way `humantime` would
    /// (`"1.204s"`), kept as a string per spec.md's field list.
    pub duration: String,
    pub status: Severity,
    pub previous_run_id: Option<Uuid>,
    pub previous_status: Option<Severity>,
    pub status_changed: bool,
    pub entity_counts: EntityCounts,
    pub settled_transactions: u64,
    pub unsettled_transactions: u64,
    pub checks: BTreeMap<String, CheckOutcome>,
    pub check_durations_ms: BTreeMap<String, u64>,
    pub delta: Option<Delta>,
}

impl Report {
    /// Look up a check's outcome by its stable name.
    pub fn check(&self, name: CheckName) -> Option<&CheckOutcome> {
        self.checks.get(name.as_str())
    }
}

/// For every check in the catalog absent from `results` after fan-out,
/// substitute `Error` if it was registered-but-produced-nothing, or
/// `Skipped` if it isn't registered at all (spec.md §4.2 step 6 / §4.6).
///
/// This distinction is load-bearing: it's how an operator notices a
/// misconfigured check instead of seeing a spurious green.
pub fn default_fill(
    mut results: BTreeMap<String, CheckOutcome>,
    registered: &[CheckName],
) -> BTreeMap<String, CheckOutcome> {
    for name in CheckName::ALL {
        if results.contains_key(name.as_str()) {
            continue;
        }
        let status = if registered.contains(&name) {
            Severity::Error
        } else {
            Severity::Skipped
        };
        results.insert(name.as_str().to_string(), CheckOutcome::Defaulted { status });
    }
    results
}

/// Derive overall status from every non-nil, non-SKIPPED per-check status
/// (spec.md §3/§8).
pub fn derive_status(checks: &BTreeMap<String, CheckOutcome>) -> Severity {
    Severity::overall_of(checks.values().map(|o| o.status()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_types::BalanceCheckResult;

    fn healthy_balance() -> CheckOutcome {
        CheckOutcome::Balance(BalanceCheckResult {
            status: Severity::Healthy,
            accounts_checked: 1,
            discrepancy_count: 0,
            negative_on_hold_count: 0,
            negative_available_count: 0,
            discrepancies: Vec::new(),
        })
    }

    #[test]
    fn every_catalog_slot_is_non_nil_after_default_fill() {
        let mut results = BTreeMap::new();
        results.insert(CheckName::Balance.as_str().to_string(), healthy_balance());
        let filled = default_fill(results, &[CheckName::Balance, CheckName::Dlq]);
        assert_eq!(filled.len(), CheckName::ALL.len());
        for name in CheckName::ALL {
            assert!(filled.contains_key(name.as_str()));
        }
    }

    #[test]
    fn registered_but_missing_is_error_not_skipped() {
        let results = BTreeMap::new();
        let filled = default_fill(results, &[CheckName::Dlq]);
        assert_eq!(
            filled.get(CheckName::Dlq.as_str()).unwrap().status(),
            Severity::Error
        );
        assert_eq!(
            filled.get(CheckName::Balance.as_str()).unwrap().status(),
            Severity::Skipped
        );
    }

    #[test]
    fn status_derivation_follows_priority() {
        let mut results = BTreeMap::new();
        results.insert(
            CheckName::Balance.as_str().to_string(),
            CheckOutcome::Defaulted {
                status: Severity::Warning,
            },
        );
        results.insert(
            CheckName::Dlq.as_str().to_string(),
            CheckOutcome::Defaulted {
                status: Severity::Error,
            },
        );
        assert_eq!(derive_status(&results), Severity::Error);

        results.insert(
            CheckName::Outbox.as_str().to_string(),
            CheckOutcome::Defaulted {
                status: Severity::Critical,
            },
        );
        assert_eq!(derive_status(&results), Severity::Critical);
    }
}
