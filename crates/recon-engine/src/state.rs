use std::sync::Arc;

use tokio::sync::RwLock;

use recon_report::Report;

/// The only shared mutable state inside the engine: the last *published*
/// report (spec.md §9 "global mutable state is limited to the 'last
/// published report' pointer"). Guarded by one readers-writer lock;
/// readers observe either the prior report or the new one, never a
/// partially-constructed one, because a run only ever calls `publish`
/// once, at the very end, with an already-immutable `Arc<Report>`.
#[derive(Default)]
pub struct RunState {
    last: RwLock<Option<Arc<Report>>>,
}

impl RunState {
    pub fn new() -> RunState {
        RunState {
            last: RwLock::new(None),
        }
    }

    /// Snapshot of "previous" taken under a read lock at run start (spec.md
    /// §4.2 step 2). May be `None` on cold start.
    pub async fn snapshot(&self) -> Option<Arc<Report>> {
        self.last.read().await.clone()
    }

    /// Atomically swap "last" under a write lock (spec.md §4.2 step 9).
    pub async fn publish(&self, report: Arc<Report>) {
        let mut guard = self.last.write().await;
        *guard = Some(report);
    }
}
