use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Transfer direction of a speed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Download, Direction::Upload];

    pub fn as_str(&self) -> &str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }

    /// Capitalized label used in human-readable messages
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Download => "Download",
            Direction::Upload => "Upload",
        }
    }
}

/// A value tracked separately for download and upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDirection<T> {
    pub download: T,
    pub upload: T,
}

impl<T> PerDirection<T> {
    pub fn new(download: T, upload: T) -> Self {
        Self { download, upload }
    }

    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Download => &self.download,
            Direction::Upload => &self.upload,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Direction, &T) -> U) -> PerDirection<U> {
        PerDirection {
            download: f(Direction::Download, &self.download),
            upload: f(Direction::Upload, &self.upload),
        }
    }
}

/// Opaque client details carried through from the measurement export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementMeta {
    pub test_id: String,
    pub version: String,
    pub os: String,
    pub browser: String,
}

/// One speed-test sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Local wall-clock time of the test, second precision
    pub timestamp: NaiveDateTime,
    /// Mbit/s
    pub download: f64,
    /// Mbit/s
    pub upload: f64,
    /// Round-trip latency in ms
    pub latency: f64,
    #[serde(default)]
    pub meta: MeasurementMeta,
}

impl Measurement {
    pub fn new(timestamp: NaiveDateTime, download: f64, upload: f64, latency: f64) -> Self {
        Self {
            timestamp,
            download,
            upload,
            latency,
            meta: MeasurementMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: MeasurementMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Calendar day the measurement is grouped under
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    #[inline]
    pub fn speed(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Download => self.download,
            Direction::Upload => self.upload,
        }
    }
}

/// Contracted download/upload speeds in Mbit/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractSpeeds {
    pub download: f64,
    pub upload: f64,
}

impl ContractSpeeds {
    pub fn new(download: f64, upload: f64) -> Result<Self, ContractError> {
        let speeds = Self { download, upload };
        speeds.check()?;
        Ok(speeds)
    }

    /// Both speeds must be finite and strictly positive
    pub fn check(&self) -> Result<(), ContractError> {
        for direction in Direction::ALL {
            let value = self.speed(direction);
            if !value.is_finite() || value <= 0.0 {
                return Err(ContractError { direction, value });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn speed(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Download => self.download,
            Direction::Upload => self.upload,
        }
    }

    /// Scale both speeds by the same factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            download: self.download * factor,
            upload: self.upload * factor,
        }
    }
}

/// Rejected contract speed
#[derive(Debug, Clone, PartialEq)]
pub struct ContractError {
    pub direction: Direction,
    pub value: f64,
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "contract {} speed must be a positive number, got {}",
            self.direction.as_str(),
            self.value
        )
    }
}

impl std::error::Error for ContractError {}
