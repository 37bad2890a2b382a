use serde::{Deserialize, Serialize};

use recon_types::CheckOutcome;

/// Field-wise `current − previous` for every comparable counter (spec.md
/// §4.5). When either side lacks the check, that field is zero — a missing
/// check is not the same as an improvement to zero, but spec.md defines the
/// delta contract this way and callers read `Option<Delta>` (None when
/// there's no previous run) to distinguish "no history" from "no change".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub balance_discrepancies: i64,
    pub double_entry_unbalanced: i64,
    pub orphan_transactions: i64,
    pub referential_orphans: i64,
    pub outbox_pending: i64,
    pub outbox_failed: i64,
    pub dlq_total: i64,
    pub redis_mismatches: i64,
}

fn balance_discrepancies(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::Balance(r) => Some(r.discrepancy_count as i64),
        _ => None,
    }
}

fn double_entry_unbalanced(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::DoubleEntry(r) => Some(r.imbalanced_count as i64),
        _ => None,
    }
}

fn orphan_transactions(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::OrphanTransactions(r) => {
            Some((r.partially_orphaned_count + r.fully_orphaned_count) as i64)
        }
        _ => None,
    }
}

fn referential_orphans(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::Referential(r) => Some(r.orphan_count as i64),
        _ => None,
    }
}

fn outbox_pending(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::Outbox(r) => Some(r.pending as i64),
        _ => None,
    }
}

fn outbox_failed(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::Outbox(r) => Some(r.failed as i64),
        _ => None,
    }
}

fn dlq_total(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::Dlq(r) => Some(r.total as i64),
        _ => None,
    }
}

fn redis_mismatches(o: &CheckOutcome) -> Option<i64> {
    match o {
        CheckOutcome::RedisBalance(r) => Some(r.mismatch_count as i64),
        CheckOutcome::Sync(r) => Some(r.version_divergence_count as i64),
        _ => None,
    }
}

/// Sum a field extractor across a set of outcomes, returning `None` when no
/// outcome in the set supplies the field at all (the owning check is
/// absent from that run), `Some(sum)` otherwise.
fn extract<'a, I: IntoIterator<Item = &'a CheckOutcome>>(
    outcomes: I,
    f: impl Fn(&CheckOutcome) -> Option<i64>,
) -> Option<i64> {
    let mut found = false;
    let mut sum = 0i64;
    for o in outcomes {
        if let Some(v) = f(o) {
            found = true;
            sum += v;
        }
    }
    found.then_some(sum)
}

/// Compute `Delta = current − previous`. Returns `None` when `previous` is
/// `None` (cold start / no history), matching spec.md's "when prev = nil,
/// Delta = nil". Per spec.md §4.5, a field is zero (not computed) when
/// either side lacks the check that owns it.
pub fn compute_delta<'a>(
    current: impl IntoIterator<Item = &'a CheckOutcome>,
    previous: Option<impl IntoIterator<Item = &'a CheckOutcome>>,
) -> Option<Delta> {
    let previous = previous?;
    let current: Vec<&CheckOutcome> = current.into_iter().collect();
    let previous: Vec<&CheckOutcome> = previous.into_iter().collect();

    macro_rules! field_delta {
        ($extractor:path) => {{
            let cur = extract(current.iter().copied(), $extractor);
            let prev = extract(previous.iter().copied(), $extractor);
            match (cur, prev) {
                (Some(c), Some(p)) => c - p,
                _ => 0,
            }
        }};
    }

    Some(Delta {
        balance_discrepancies: field_delta!(balance_discrepancies),
        double_entry_unbalanced: field_delta!(double_entry_unbalanced),
        orphan_transactions: field_delta!(orphan_transactions),
        referential_orphans: field_delta!(referential_orphans),
        outbox_pending: field_delta!(outbox_pending),
        outbox_failed: field_delta!(outbox_failed),
        dlq_total: field_delta!(dlq_total),
        redis_mismatches: field_delta!(redis_mismatches),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_types::{BalanceCheckResult, OutboxCheckResult, Severity};

    fn balance(count: u64) -> CheckOutcome {
        CheckOutcome::Balance(BalanceCheckResult {
            status: Severity::Healthy,
            accounts_checked: 10,
            discrepancy_count: count,
            negative_on_hold_count: 0,
            negative_available_count: 0,
            discrepancies: Vec::new(),
        })
    }

    fn outbox(pending: u64, failed: u64) -> CheckOutcome {
        CheckOutcome::Outbox(OutboxCheckResult {
            status: Severity::Healthy,
            pending,
            processing: 0,
            stale_processing: 0,
            failed,
            entries: Vec::new(),
        })
    }

    #[test]
    fn no_previous_is_none() {
        let current = vec![balance(3)];
        assert!(compute_delta(current.iter(), None::<std::vec::IntoIter<&CheckOutcome>>).is_none());
    }

    #[test]
    fn delta_is_current_minus_previous() {
        let current = vec![balance(5), outbox(2, 1)];
        let previous = vec![balance(2), outbox(1, 1)];
        let delta = compute_delta(current.iter(), Some(previous.iter())).unwrap();
        assert_eq!(delta.balance_discrepancies, 3);
        assert_eq!(delta.outbox_pending, 1);
        assert_eq!(delta.outbox_failed, 0);
    }

    #[test]
    fn missing_check_on_either_side_is_zero() {
        let current = vec![balance(5)];
        let previous = vec![outbox(1, 1)];
        let delta = compute_delta(current.iter(), Some(previous.iter())).unwrap();
        // balance is absent from `previous` -> zero, not 5 - 0.
        assert_eq!(delta.balance_discrepancies, 0);
        // outbox is absent from `current` -> zero, not 0 - 1.
        assert_eq!(delta.outbox_pending, 0);
    }
}
