//! Markdown and CSV exports of measurement tables

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::models::Measurement;
use crate::stats;

const CSV_HEADER: [&str; 6] = [
    "Date/Time",
    "Download (Mbit/s)",
    "Upload (Mbit/s)",
    "Ping (ms)",
    "Operating system",
    "Browser",
];

/// Markdown document with a statistics block and one row per measurement
pub fn measurements_markdown(rows: &[Measurement], exported_at: NaiveDateTime) -> String {
    if rows.is_empty() {
        return "# Broadband measurement export\n\nNo data available.\n".to_string();
    }

    let s = stats::aggregate(rows);
    let mut md = String::from("# Broadband measurement export\n\n");
    let _ = writeln!(md, "**Exported at**: {}", exported_at.format("%d.%m.%Y %H:%M:%S"));
    let _ = writeln!(md, "**Measurements**: {}\n", s.count);

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|------|\n");
    for (label, summary, unit) in [
        ("Download", s.download, "Mbit/s"),
        ("Upload", s.upload, "Mbit/s"),
        ("Ping", s.latency, "ms"),
    ] {
        let _ = writeln!(md, "| Avg {} | {:.2} {} |", label, summary.avg, unit);
        let _ = writeln!(md, "| Min {} | {:.2} {} |", label, summary.min, unit);
        let _ = writeln!(md, "| Max {} | {:.2} {} |", label, summary.max, unit);
    }

    md.push_str("\n## Measurements\n\n");
    md.push_str("| Date/Time | Download | Upload | Ping | OS | Browser |\n");
    md.push_str("|---|---|---|---|---|---|\n");
    for m in rows {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} |",
            m.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            m.download,
            m.upload,
            m.latency,
            escape_markdown(&m.meta.os),
            escape_markdown(&m.meta.browser)
        );
    }
    md
}

/// Comma-separated table with a header row
pub fn measurements_csv(rows: &[Measurement]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for m in rows {
        let fields = [
            m.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            m.download.to_string(),
            m.upload.to_string(),
            m.latency.to_string(),
            escape_csv(&m.meta.os),
            escape_csv(&m.meta.browser),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn escape_markdown(value: &str) -> String {
    value.replace('|', "\\|")
}

fn escape_csv(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeasurementMeta;
    use chrono::NaiveDate;

    fn rows() -> Vec<Measurement> {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        vec![
            Measurement::new(ts, 100.0, 40.0, 10.0).with_meta(MeasurementMeta {
                os: "Linux".into(),
                browser: "Firefox, ESR".into(),
                ..MeasurementMeta::default()
            }),
            Measurement::new(ts + chrono::Duration::minutes(5), 50.0, 20.0, 30.0),
        ]
    }

    #[test]
    fn test_markdown_export() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let md = measurements_markdown(&rows(), at);
        assert!(md.contains("**Exported at**: 06.03.2024 10:00:00"));
        assert!(md.contains("**Measurements**: 2"));
        assert!(md.contains("| Avg Download | 75.00 Mbit/s |"));
        assert!(md.contains("| Max Ping | 30.00 ms |"));
        assert!(md.contains("| 2024-03-05T08:15:00 | 100 | 40 | 10 | Linux | Firefox, ESR |"));
    }

    #[test]
    fn test_markdown_export_empty() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert!(measurements_markdown(&[], at).contains("No data available."));
    }

    #[test]
    fn test_csv_export_quotes_fields() {
        let csv = measurements_csv(&rows());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Date/Time,Download (Mbit/s),Upload (Mbit/s),Ping (ms),Operating system,Browser"
        );
        assert_eq!(lines[1], "2024-03-05T08:15:00,100,40,10,Linux,\"Firefox, ESR\"");
        assert_eq!(lines[2], "2024-03-05T08:20:00,50,20,30,,");
    }
}
