use serde::{Deserialize, Serialize};

/// Per-check tunables. A check reads only the subset it needs; entries it
/// doesn't understand resolve to its own documented default (callers never
/// need a check-specific config type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Minimum magnitude a balance discrepancy must reach to be reported at
    /// all. Signed so a future check can reuse the same field for a
    /// direction-sensitive threshold.
    pub discrepancy_threshold: i64,
    /// Sample cap applied uniformly to every check's offending-record list.
    pub max_results: usize,
    /// How long after acceptance a transaction is expected to have settled.
    pub stale_threshold_secs: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            discrepancy_threshold: 0,
            max_results: 100,
            stale_threshold_secs: 300,
        }
    }
}

impl CheckerConfig {
    /// Truncate `rows` to `max_results`, returning the total count discovered
    /// (not just the sampled ones) alongside the bounded sample.
    pub fn sample<T>(&self, rows: Vec<T>) -> (u64, Vec<T>) {
        let total = rows.len() as u64;
        let mut rows = rows;
        rows.truncate(self.max_results);
        (total, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_truncates_but_keeps_total_count() {
        let cfg = CheckerConfig {
            max_results: 2,
            ..CheckerConfig::default()
        };
        let (total, sampled) = cfg.sample(vec![1, 2, 3, 4, 5]);
        assert_eq!(total, 5);
        assert_eq!(sampled, vec![1, 2]);
    }

    #[test]
    fn sample_under_cap_is_unchanged() {
        let cfg = CheckerConfig::default();
        let (total, sampled) = cfg.sample(vec![1, 2]);
        assert_eq!(total, 2);
        assert_eq!(sampled, vec![1, 2]);
    }
}
