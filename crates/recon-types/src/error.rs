/// Error taxonomy kinds (spec.md §7). These are the only errors that
/// legitimately exist inside a check's execution; everything else is
/// downgraded to an `Error`-severity slot by the engine before it can
/// propagate further.
#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("check execution failed: {0}")]
    ExecutionFailed(#[source] anyhow::Error),

    #[error("check result could not be placed in its report slot: {0}")]
    ResultShapeMismatch(String),

    #[error("check did not complete before the run deadline")]
    DeadlineExceeded,

    #[error("check was cancelled")]
    Cancelled,
}

/// Errors that can legitimately leave [`recon_engine`]'s `Engine::run` (the
/// crate doesn't exist at this dependency level, hence the doc-only
/// reference). Per spec.md §7 these are programmer errors, not conditions a
/// correct caller should ever observe.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("the \"last published report\" lock was poisoned by a prior panic")]
    Poisoned,

    #[error("no checks are registered in the catalog")]
    EmptyCatalog,

    #[error("duplicate check name registered in the catalog: {0}")]
    DuplicateCheck(String),
}
