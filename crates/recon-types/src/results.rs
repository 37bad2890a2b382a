use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// One (account, asset) balance that doesn't equal Σ its signed operations,
/// or an account showing a negative balance where none is allowed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceDiscrepancy {
    pub account_id: String,
    pub asset_code: String,
    pub recorded_balance: i64,
    pub computed_from_operations: i64,
    pub on_hold: i64,
    pub available: i64,
    pub is_liability_account: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceCheckResult {
    pub status: Severity,
    pub accounts_checked: u64,
    pub discrepancy_count: u64,
    pub negative_on_hold_count: u64,
    pub negative_available_count: u64,
    pub discrepancies: Vec<BalanceDiscrepancy>,
}

/// A transaction whose Σcredits − Σdebits per asset is non-zero, or which
/// has zero operations at all.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImbalancedTransaction {
    pub transaction_id: String,
    pub asset_code: String,
    pub sum_debits: i64,
    pub sum_credits: i64,
    pub imbalance: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DoubleEntryCheckResult {
    pub status: Severity,
    pub transactions_checked: u64,
    pub transactions_without_operations: u64,
    pub imbalanced_count: u64,
    pub imbalanced: Vec<ImbalancedTransaction>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrphanTransaction {
    pub transaction_id: String,
    pub operations_present: u64,
    pub operations_expected: u64,
    pub accepted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrphanTransactionsCheckResult {
    pub status: Severity,
    pub transactions_checked: u64,
    pub partially_orphaned_count: u64,
    pub fully_orphaned_count: u64,
    pub orphans: Vec<OrphanTransaction>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferentialOrphan {
    pub entity: String,
    pub entity_id: String,
    pub missing_reference: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferentialCheckResult {
    pub status: Severity,
    pub entities_checked: u64,
    pub orphan_count: u64,
    pub orphan_rate_bps: u64,
    pub orphans: Vec<ReferentialOrphan>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncMismatch {
    pub account_id: String,
    pub asset_code: String,
    pub db_version: i64,
    pub cache_version: i64,
    pub staleness_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncCheckResult {
    pub status: Severity,
    pub balances_checked: u64,
    pub version_divergence_count: u64,
    pub stale_count: u64,
    pub mismatches: Vec<SyncMismatch>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisValueMismatch {
    pub account_id: String,
    pub asset_code: String,
    pub db_value: i64,
    /// `None` when the balance is entirely absent from the cache (a miss
    /// counts toward `mismatch_count` but never `value_mismatch_count`,
    /// since there's no cached value to disagree with).
    pub cache_value: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisBalanceCheckResult {
    pub status: Severity,
    pub balances_sampled: u64,
    pub mismatch_count: u64,
    pub value_mismatch_count: u64,
    pub mismatches: Vec<RedisValueMismatch>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DlqEntry {
    pub message_id: String,
    pub topic: String,
    pub failed_at: chrono::DateTime<chrono::Utc>,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DlqCheckResult {
    pub status: Severity,
    pub total: u64,
    pub entries: Vec<DlqEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboxBacklogEntry {
    pub message_id: String,
    pub state: String,
    pub age_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboxCheckResult {
    pub status: Severity,
    pub pending: u64,
    pub processing: u64,
    pub stale_processing: u64,
    pub failed: u64,
    pub entries: Vec<OutboxBacklogEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataIssue {
    pub entity_id: String,
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataCheckResult {
    pub status: Severity,
    pub documents_checked: u64,
    pub missing_entity_id_count: u64,
    pub duplicate_count: u64,
    pub empty_count: u64,
    pub missing_rate_bps: u64,
    pub issues: Vec<MetadataIssue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrossDbMissingReference {
    pub ledger_entity: String,
    pub ledger_entity_id: String,
    pub catalog_reference: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrossDbCheckResult {
    pub status: Severity,
    pub references_checked: u64,
    pub missing_count: u64,
    pub missing_rate_bps: u64,
    pub missing: Vec<CrossDbMissingReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrmAliasIssue {
    pub alias_id: String,
    pub account_id: Option<String>,
    pub ledger_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrmAliasCheckResult {
    pub status: Severity,
    pub aliases_checked: u64,
    pub missing_count: u64,
    pub missing_rate_bps: u64,
    pub issues: Vec<CrmAliasIssue>,
}

/// Tagged union of every concrete check result. This is the engine's
/// dispatch target: placing a result in the wrong slot is a compile error,
/// and an unrecognized check name never reaches this type at all (it's
/// logged and counted as `Error` by name before this point).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "check", content = "result", rename_all = "snake_case")]
pub enum CheckOutcome {
    Balance(BalanceCheckResult),
    DoubleEntry(DoubleEntryCheckResult),
    OrphanTransactions(OrphanTransactionsCheckResult),
    Referential(ReferentialCheckResult),
    Sync(SyncCheckResult),
    RedisBalance(RedisBalanceCheckResult),
    Dlq(DlqCheckResult),
    Outbox(OutboxCheckResult),
    Metadata(MetadataCheckResult),
    CrossDb(CrossDbCheckResult),
    CrmAlias(CrmAliasCheckResult),
    /// Produced by the engine itself, never by a check implementation:
    /// either the check panicked/errored, or it was not registered at all.
    Defaulted { status: Severity },
    /// A fixture outcome with no backing shape, used by test checks that
    /// only need to drive the engine with an arbitrary severity
    /// (`recon-testkit::FakeCheck`). Never produced by a real check.
    Synthetic { status: Severity },
}

impl CheckOutcome {
    pub fn status(&self) -> Severity {
        match self {
            CheckOutcome::Balance(r) => r.status,
            CheckOutcome::DoubleEntry(r) => r.status,
            CheckOutcome::OrphanTransactions(r) => r.status,
            CheckOutcome::Referential(r) => r.status,
            CheckOutcome::Sync(r) => r.status,
            CheckOutcome::RedisBalance(r) => r.status,
            CheckOutcome::Dlq(r) => r.status,
            CheckOutcome::Outbox(r) => r.status,
            CheckOutcome::Metadata(r) => r.status,
            CheckOutcome::CrossDb(r) => r.status,
            CheckOutcome::CrmAlias(r) => r.status,
            CheckOutcome::Defaulted { status } => *status,
            CheckOutcome::Synthetic { status } => *status,
        }
    }
}
