/// Basis-points rate, saturating rather than panicking on overflow and
/// defined as zero over an empty population (nothing to violate).
pub(crate) fn rate_bps(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    count.saturating_mul(10_000) / total
}
