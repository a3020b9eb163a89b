//! Parser for the CSV export of the desktop measurement app
//!
//! Semicolon-delimited, one header row, values optionally wrapped in
//! double quotes, German date format and decimal commas:
//!
//! ```text
//! "Messzeitpunkt";"Uhrzeit";"Download (Mbit/s)";"Upload (Mbit/s)";"Laufzeit (ms)";"Test-ID";"Version";"Betriebssystem";"Internet-Browser"
//! "05.03.2024";"08:15:02";"231,45";"38,12";"14";"abc123";"3.7.0";"Windows 10";"Firefox 123"
//! ```

use chrono::NaiveDateTime;

use crate::models::{Measurement, MeasurementMeta};

pub const COL_DATE: &str = "Messzeitpunkt";
pub const COL_TIME: &str = "Uhrzeit";
pub const COL_DOWNLOAD: &str = "Download (Mbit/s)";
pub const COL_UPLOAD: &str = "Upload (Mbit/s)";
pub const COL_LATENCY: &str = "Laufzeit (ms)";
pub const COL_TEST_ID: &str = "Test-ID";
pub const COL_VERSION: &str = "Version";
pub const COL_OS: &str = "Betriebssystem";
pub const COL_BROWSER: &str = "Internet-Browser";

const DELIMITER: char = ';';
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// A row that could not be turned into a measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for RowError {}

/// Parsed rows of one export plus the rows that were skipped
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub measurements: Vec<Measurement>,
    pub skipped: Vec<RowError>,
}

struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn get<'r>(&self, record: &'r [String], name: &str) -> Option<&'r str> {
        self.index(name)
            .and_then(|i| record.get(i))
            .map(String::as_str)
    }
}

/// Parse one export file's contents. Blank lines are ignored.
pub fn parse_export(content: &str) -> ParsedExport {
    let mut parsed = ParsedExport::default();
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        return parsed;
    };
    let columns = Columns {
        names: split_record(header),
    };

    for (idx, line) in lines {
        let record = split_record(line);
        match parse_record(&columns, &record) {
            Ok(m) => parsed.measurements.push(m),
            Err(message) => parsed.skipped.push(RowError {
                line: idx + 1,
                message,
            }),
        }
    }
    parsed
}

fn parse_record(columns: &Columns, record: &[String]) -> Result<Measurement, String> {
    let date = columns
        .get(record, COL_DATE)
        .ok_or_else(|| format!("missing column '{}'", COL_DATE))?;
    let time = columns
        .get(record, COL_TIME)
        .ok_or_else(|| format!("missing column '{}'", COL_TIME))?;
    let stamp = format!("{} {}", date, time);
    let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .map_err(|e| format!("invalid timestamp '{}': {}", stamp, e))?;

    let number = |name: &str| -> Result<f64, String> {
        match columns.get(record, name) {
            None => Ok(0.0),
            Some(raw) => parse_decimal(raw).map_err(|e| format!("{}: {}", name, e)),
        }
    };
    let text = |name: &str| columns.get(record, name).unwrap_or_default().to_string();

    Ok(Measurement {
        timestamp,
        download: number(COL_DOWNLOAD)?,
        upload: number(COL_UPLOAD)?,
        latency: number(COL_LATENCY)?,
        meta: MeasurementMeta {
            test_id: text(COL_TEST_ID),
            version: text(COL_VERSION),
            os: text(COL_OS),
            browser: text(COL_BROWSER),
        },
    })
}

/// Accepts both `231,45` and `231.45`
pub fn parse_decimal(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid number '{}'", trimmed))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("value out of range '{}'", trimmed));
    }
    Ok(value)
}

/// Split a record on `;`, honouring double-quoted fields (with `""` escapes)
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == DELIMITER && !quoted => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
