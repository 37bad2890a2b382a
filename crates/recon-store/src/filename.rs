use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

/// `reconciliation_<UTC-YYYYMMDD_HHMMSS>_<RunID>.json` — the only filename
/// shape this store ever writes. The timestamp embedded here is
/// authoritative for ordering (spec.md §4.3); everything else is a
/// fallback for files this process didn't produce itself (manual copies,
/// a future format) or whose name got clobbered.
pub fn build_filename(run_id: Uuid, timestamp: DateTime<Utc>) -> String {
    format!(
        "reconciliation_{}_{}.json",
        timestamp.format("%Y%m%d_%H%M%S"),
        run_id
    )
}

/// Parses the embedded timestamp out of a filename, returning `None` if the
/// name isn't in canonical form (arbitrary file dropped into the directory,
/// truncated name, etc).
pub fn parse_filename_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    let rest = filename.strip_prefix("reconciliation_")?;
    let rest = rest.strip_suffix(".json")?;
    let mut parts = rest.splitn(3, '_');
    let date = parts.next()?;
    let time = parts.next()?;
    let run_id = parts.next()?;
    if date.len() != 8 || time.len() != 6 {
        return None;
    }
    if !date.bytes().all(|b| b.is_ascii_digit()) || !time.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if Uuid::parse_str(run_id).is_err() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_build_and_parse() {
        let run_id = Uuid::new_v4();
        let ts = DateTime::parse_from_rfc3339("2026-07-27T21:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = build_filename(run_id, ts);
        assert_eq!(parse_filename_timestamp(&name), Some(ts));
    }

    #[test]
    fn rejects_non_canonical_names() {
        assert_eq!(parse_filename_timestamp("not_a_report.json"), None);
        assert_eq!(parse_filename_timestamp("reconciliation_bad_shape.json"), None);
    }
}
