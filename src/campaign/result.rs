//! Result records produced by the validator and evaluator

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::campaign::grouping::DayGroups;
use crate::models::{ContractSpeeds, Measurement, PerDirection};
use crate::stats::{self, Statistics};

/// Per-direction outcome counted in days
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayCountCheck {
    pub days: usize,
    pub failed: bool,
}

/// Per-direction outcome counted in measurements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareCheck {
    /// Measurements at or above the normally available speed
    pub reaching: usize,
    pub total: usize,
    pub percentage: f64,
    pub failed: bool,
}

/// One regulatory condition evaluated for both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition<T> {
    pub check: String,
    pub download: T,
    pub upload: T,
    /// Either direction failed
    pub failed: bool,
}

impl<T> Condition<T> {
    pub fn new(check: impl Into<String>, outcome: PerDirection<T>, failed: impl Fn(&T) -> bool) -> Self {
        let failed = failed(&outcome.download) || failed(&outcome.upload);
        Self {
            check: check.into(),
            download: outcome.download,
            upload: outcome.upload,
            failed,
        }
    }
}

/// The three conditions of the underperformance test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionBreakdown {
    /// 90 % of the contract speed reached on at least 2 of 3 days
    pub peak: Condition<DayCountCheck>,
    /// Normally available speed reached in at least 90 % of measurements
    pub aggregate: Condition<ShareCheck>,
    /// Minimum speed undercut on 2 or more days
    pub floor: Condition<DayCountCheck>,
}

impl ConditionBreakdown {
    pub fn any_failed(&self) -> bool {
        self.peak.failed || self.aggregate.failed || self.floor.failed
    }
}

/// Descriptive snapshot attached to every result, even failed ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total_measurements: usize,
    pub day_count: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub statistics: Statistics,
    pub contract: Option<ContractSpeeds>,
    pub days_reaching_peak: PerDirection<usize>,
    pub days_below_minimum: PerDirection<usize>,
    pub percentage_normal: PerDirection<f64>,
}

impl CampaignStats {
    /// Snapshot over all given measurements, without verdict figures
    pub fn snapshot(measurements: &[Measurement]) -> Self {
        let groups = DayGroups::new(measurements);
        Self::from_groups(measurements, &groups)
    }

    pub(crate) fn from_groups(measurements: &[Measurement], groups: &DayGroups<'_>) -> Self {
        Self {
            total_measurements: measurements.len(),
            day_count: groups.len(),
            first_day: groups.first_day(),
            last_day: groups.last_day(),
            statistics: stats::aggregate(measurements),
            ..Self::default()
        }
    }

    pub fn date_range_label(&self) -> String {
        match (self.first_day, self.last_day) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "N/A".to_string(),
        }
    }
}

/// Outcome of validating (and optionally evaluating) a measurement campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Structural validity (count, days, per-day count, span, gaps)
    pub valid: bool,
    pub errors: Vec<String>,
    /// Spacing deviations; do not affect `valid`
    pub warnings: Vec<String>,
    pub underperformance: bool,
    pub breakdown: Option<ConditionBreakdown>,
    pub reason: String,
    pub stats: CampaignStats,
}

impl ValidationResult {
    pub(crate) fn new(stats: CampaignStats) -> Self {
        Self {
            valid: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            underperformance: false,
            breakdown: None,
            reason: String::new(),
            stats,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
