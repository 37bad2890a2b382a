use serde::{Deserialize, Serialize};

/// Outcome level of a single consistency check, or of the report as a whole.
///
/// `Healthy`, `Warning` and `Critical` are totally ordered. `Error` (the
/// check itself failed to execute) and `Skipped` (the check is not
/// configured) are terminal values outside that order — they never compare
/// as more or less severe than the three content levels; aggregation uses
/// the fixed priority in [`Severity::worse_of`] instead of `Ord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Healthy,
    Warning,
    Critical,
    Error,
    Skipped,
    /// Only ever used when no report exists yet.
    Unknown,
}

impl Severity {
    /// Aggregation priority: `Critical > Error > Warning > Healthy`.
    /// `Skipped` and `Unknown` never win — they contribute nothing to the
    /// overall status.
    fn rank(self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Healthy => 0,
            Severity::Skipped | Severity::Unknown => 0,
        }
    }

    /// Whether this severity participates in overall-status aggregation.
    pub fn counts_toward_overall(self) -> bool {
        !matches!(self, Severity::Skipped)
    }

    /// Fold two severities per the overall-status priority rule.
    pub fn worse_of(self, other: Severity) -> Severity {
        if !self.counts_toward_overall() {
            return other;
        }
        if !other.counts_toward_overall() {
            return self;
        }
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// Derive overall status from a set of per-check severities, per
    /// spec.md §3/§8: `Critical` if any; else `Error` if any; else
    /// `Warning` if any; else `Healthy`. An empty/all-skipped set is
    /// `Healthy`.
    pub fn overall_of<I: IntoIterator<Item = Severity>>(severities: I) -> Severity {
        severities
            .into_iter()
            .filter(|s| s.counts_toward_overall())
            .fold(Severity::Healthy, Severity::worse_of)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Healthy => "HEALTHY",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Skipped => "SKIPPED",
            Severity::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_beats_everything() {
        assert_eq!(
            Severity::overall_of([Severity::Warning, Severity::Critical, Severity::Error]),
            Severity::Critical
        );
    }

    #[test]
    fn error_beats_warning_when_no_critical() {
        assert_eq!(
            Severity::overall_of([Severity::Warning, Severity::Error]),
            Severity::Error
        );
    }

    #[test]
    fn warning_alone() {
        assert_eq!(Severity::overall_of([Severity::Warning]), Severity::Warning);
    }

    #[test]
    fn healthy_when_empty_or_all_skipped() {
        assert_eq!(Severity::overall_of([]), Severity::Healthy);
        assert_eq!(
            Severity::overall_of([Severity::Skipped, Severity::Skipped]),
            Severity::Healthy
        );
    }

    #[test]
    fn skipped_never_wins() {
        assert_eq!(
            Severity::overall_of([Severity::Skipped, Severity::Warning]),
            Severity::Warning
        );
    }
}
