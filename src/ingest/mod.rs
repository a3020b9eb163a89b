//! Loading measurement exports from disk

pub mod csv;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::models::Measurement;

pub use self::csv::{parse_export, ParsedExport, RowError};

/// File name prefix of exports written by the measurement app
pub const DEFAULT_FILE_PREFIX: &str = "Breitbandmessung_";

/// Load every `<prefix>*.csv` file in `dir`, in file-name order.
///
/// Unreadable files and malformed rows are skipped with a warning. A
/// missing directory yields no measurements. The result is sorted by
/// timestamp; equal timestamps keep file order.
pub fn load_dir(dir: &Path, prefix: &str) -> Result<Vec<Measurement>> {
    if !dir.exists() {
        warn!(path = %dir.display(), "measurement directory does not exist");
        return Ok(Vec::new());
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read measurement directory: {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".csv"))
        })
        .collect();
    files.sort();

    let mut measurements = Vec::new();
    for path in &files {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable export");
                continue;
            }
        };
        let parsed = parse_export(&content);
        for row in &parsed.skipped {
            warn!(file = %path.display(), line = row.line, "skipping row: {}", row.message);
        }
        debug!(
            file = %path.display(),
            rows = parsed.measurements.len(),
            skipped = parsed.skipped.len(),
            "export parsed"
        );
        measurements.extend(parsed.measurements);
    }

    measurements.sort_by_key(|m| m.timestamp);
    info!(
        files = files.len(),
        measurements = measurements.len(),
        "measurements loaded"
    );
    Ok(measurements)
}

/// Measurements taken within the last `days` days before `now`.
///
/// A window reaching past the earliest representable date keeps everything.
pub fn filter_by_timeframe(
    measurements: &[Measurement],
    days: u32,
    now: NaiveDateTime,
) -> Vec<Measurement> {
    let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(days))) else {
        return measurements.to_vec();
    };
    measurements
        .iter()
        .filter(|m| m.timestamp >= cutoff)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Messzeitpunkt;Uhrzeit;Download (Mbit/s);Upload (Mbit/s);Laufzeit (ms);Test-ID;Version;Betriebssystem;Internet-Browser";

    fn write(dir: &TempDir, name: &str, rows: &[&str]) {
        let mut body = String::from(HEADER);
        for row in rows {
            body.push('\n');
            body.push_str(row);
        }
        fs::write(dir.path().join(name), body).unwrap();
    }

    #[test]
    fn test_load_dir_merges_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "Breitbandmessung_2024_03_06.csv",
            &["06.03.2024;09:00:00;200,5;40;12;b;1;Linux;Firefox"],
        );
        write(
            &dir,
            "Breitbandmessung_2024_03_05.csv",
            &[
                "05.03.2024;10:00:00;100;40;12;a2;1;Linux;Firefox",
                "05.03.2024;08:00:00;150;40;12;a1;1;Linux;Firefox",
                "not;a;row",
            ],
        );
        write(&dir, "other.csv", &["07.03.2024;09:00:00;1;1;1;x;1;Linux;Firefox"]);

        let loaded = load_dir(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        let ids: Vec<&str> = loaded.iter().map(|m| m.meta.test_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b"]);
        assert_eq!(loaded[2].download, 200.5);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dir(&dir.path().join("nope"), DEFAULT_FILE_PREFIX).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_filter_by_timeframe() {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rows: Vec<Measurement> = (0..10)
            .map(|d| {
                let ts = (base + Duration::days(d)).and_hms_opt(12, 0, 0).unwrap();
                Measurement::new(ts, 100.0, 40.0, 10.0)
            })
            .collect();
        let now = (base + Duration::days(9)).and_hms_opt(12, 0, 0).unwrap();

        let recent = filter_by_timeframe(&rows, 3, now);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[0].timestamp, rows[6].timestamp);
        assert_eq!(filter_by_timeframe(&rows, 30, now).len(), 10);
    }

    #[test]
    fn test_huge_timeframe_keeps_everything() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let rows = vec![Measurement::new(ts, 100.0, 40.0, 10.0)];
        assert_eq!(filter_by_timeframe(&rows, u32::MAX, ts), rows);
        assert!(filter_by_timeframe(&[], u32::MAX, ts).is_empty());
    }
}
