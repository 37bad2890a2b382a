use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::results::CheckOutcome;

/// Stable identifiers for every check in the catalog (spec.md §4.1). The
/// string form (`as_str`) is what's persisted in reports and used for
/// registry lookups — it must never change once shipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckName {
    Balance,
    DoubleEntry,
    OrphanTransactions,
    Referential,
    Sync,
    RedisBalance,
    Dlq,
    Outbox,
    Metadata,
    CrossDb,
    CrmAlias,
}

impl CheckName {
    pub const ALL: [CheckName; 11] = [
        CheckName::Balance,
        CheckName::DoubleEntry,
        CheckName::OrphanTransactions,
        CheckName::Referential,
        CheckName::Sync,
        CheckName::RedisBalance,
        CheckName::Dlq,
        CheckName::Outbox,
        CheckName::Metadata,
        CheckName::CrossDb,
        CheckName::CrmAlias,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckName::Balance => "balance",
            CheckName::DoubleEntry => "double_entry",
            CheckName::OrphanTransactions => "orphan_transactions",
            CheckName::Referential => "referential",
            CheckName::Sync => "sync",
            CheckName::RedisBalance => "redis_balance",
            CheckName::Dlq => "dlq",
            CheckName::Outbox => "outbox",
            CheckName::Metadata => "metadata",
            CheckName::CrossDb => "cross_db",
            CheckName::CrmAlias => "crm_alias",
        }
    }

    pub fn from_str(s: &str) -> Option<CheckName> {
        CheckName::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run context handed to every check. Cheap to clone: everything inside
/// is itself a handle (pool, cancellation token, a read-only snapshot of
/// the previous published report's check outcomes).
#[derive(Clone)]
pub struct CheckContext {
    pub cancellation: CancellationToken,
    /// The previous *published* run's per-check outcomes, if any. This is
    /// already-immutable history, not the report under construction — a
    /// check reading it (e.g. `outbox` comparing failed-count trend) does
    /// not violate the "checks never see the report" rule, which is about
    /// the in-flight report this run is building.
    pub previous: Option<Arc<BTreeMap<String, CheckOutcome>>>,
}

impl CheckContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            previous: None,
        }
    }

    pub fn with_previous(
        cancellation: CancellationToken,
        previous: Option<Arc<BTreeMap<String, CheckOutcome>>>,
    ) -> Self {
        Self {
            cancellation,
            previous,
        }
    }

    /// True once the shared run deadline has fired or the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn previous_outcome(&self, name: CheckName) -> Option<&CheckOutcome> {
        self.previous.as_ref()?.get(name.as_str())
    }
}

/// Uniform interface for one consistency probe (spec.md §4.1).
///
/// Implementors MUST respect `ctx` cancellation, MUST NOT mutate any
/// source, and MUST return at most `cfg.max_results` sample rows while
/// still reporting the *total* discovered count.
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable identifier; uniqueness is enforced at catalog registration.
    fn name(&self) -> CheckName;

    async fn check(
        &self,
        ctx: CheckContext,
        cfg: &CheckerConfig,
    ) -> Result<CheckOutcome, CheckError>;
}
