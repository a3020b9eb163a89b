//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so partial files are
//! accepted.
//!
//! ```toml
//! [data]
//! measurements_path = "./messprotokoll"
//!
//! [contract]
//! download = 300.0
//! upload = 150.0
//!
//! [check]
//! timeframe_days = 30
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::ingest::DEFAULT_FILE_PREFIX;
use crate::models::ContractSpeeds;

pub const CONFIG_PATH_VAR: &str = "BNETZA_CONFIG_PATH";
pub const DATA_PATH_VAR: &str = "BNETZA_DATA_PATH";
const DEFAULT_CONFIG_PATH: &str = "bnetza.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,

    /// Contracted speeds used when none are given on the command line
    #[serde(default = "default_contract")]
    pub contract: ContractSpeeds,

    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV exports
    #[serde(default = "default_measurements_path")]
    pub measurements_path: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            measurements_path: default_measurements_path(),
            file_prefix: default_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Only consider the last N days; 0 uses all measurements
    #[serde(default = "default_timeframe_days")]
    pub timeframe_days: u32,
}

impl CheckConfig {
    pub fn timeframe(&self) -> Option<u32> {
        (self.timeframe_days > 0).then_some(self.timeframe_days)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeframe_days: default_timeframe_days(),
        }
    }
}

fn default_measurements_path() -> PathBuf {
    PathBuf::from("./messprotokoll")
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_contract() -> ContractSpeeds {
    ContractSpeeds {
        download: 300.0,
        upload: 150.0,
    }
}

fn default_timeframe_days() -> u32 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            contract: default_contract(),
            check: CheckConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.contract.check()?;
        Ok(config)
    }

    /// Load `path` if it exists; a missing file yields defaults, any other
    /// read or parse failure is an error
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {:?}, using defaults", path);
                Ok(Self::default())
            }
            _ => Self::load(path),
        }
    }

    /// Load from `BNETZA_CONFIG_PATH` (or `bnetza.toml`), falling back to
    /// defaults when the file does not exist. `BNETZA_DATA_PATH` overrides
    /// the measurement directory.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_or_default(&path)?;

        if let Ok(data_path) = std::env::var(DATA_PATH_VAR) {
            config.data.measurements_path = PathBuf::from(data_path);
        }
        Ok(config)
    }
}
