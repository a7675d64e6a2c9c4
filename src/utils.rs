// Utility functions
use chrono::{DateTime, Utc};

/// Parses a Unix timestamp in seconds (as sent by the source, e.g. `"1602979200"`).
pub fn parse_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Median of a non-empty slice; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// File name used for CSV export: `stl_<keyword, spaces as underscores>.csv`.
pub fn export_file_name(keyword: &str) -> String {
    format!("stl_{}.csv", keyword.trim().replace(' ', "_"))
}
