//! Underperformance verdict for a structurally valid campaign
//!
//! Underperformance is found if at least one of the following holds, for
//! download or for upload:
//!
//! 1. 90 % of the contract speed is reached on fewer than 2 of the 3 days
//! 2. the normally available speed is reached in fewer than 90 % of all
//!    measurements
//! 3. the minimum speed (30 % of contract) is undercut on 2 or more days
//!
//! This is an informational approximation of the procedure, not the
//! legally binding assessment.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::campaign::grouping::DayGroups;
use crate::campaign::result::{
    Condition, ConditionBreakdown, DayCountCheck, ShareCheck, ValidationResult,
};
use crate::campaign::rules;
use crate::campaign::validator::validate;
use crate::models::{ContractError, ContractSpeeds, Direction, Measurement, PerDirection};

pub const NO_UNDERPERFORMANCE: &str = "No underperformance detected - all criteria met";

const REASON_SEPARATOR: &str = " | ";

/// Speed thresholds derived from the contract
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedThresholds {
    /// Normally available speed
    pub normal: PerDirection<f64>,
    /// 90 % of contract
    pub peak: PerDirection<f64>,
    /// 30 % of contract
    pub minimum: PerDirection<f64>,
}

impl From<ContractSpeeds> for SpeedThresholds {
    fn from(contract: ContractSpeeds) -> Self {
        let base = PerDirection::new(contract.download, contract.upload);
        Self {
            normal: base,
            peak: base.map(|_, v| v * rules::PEAK_FACTOR),
            minimum: base.map(|_, v| v * rules::MINIMUM_FACTOR),
        }
    }
}

/// Evaluation refused before any verdict was computed
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The campaign fails tiers 1-5 of the validator
    InvalidCampaign { errors: Vec<String> },
    InvalidContract(ContractError),
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCampaign { errors } => write!(
                f,
                "evaluation requires a structurally valid campaign: {}",
                errors.join("; ")
            ),
            Self::InvalidContract(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl From<ContractError> for EvaluationError {
    fn from(e: ContractError) -> Self {
        Self::InvalidContract(e)
    }
}

/// Validate `campaign` and compute the underperformance verdict.
///
/// Fails with [`EvaluationError::InvalidCampaign`] if the campaign is not
/// structurally valid; call [`validate`] first to get the full report in
/// that case.
pub fn evaluate(
    campaign: &[Measurement],
    contract: ContractSpeeds,
) -> Result<ValidationResult, EvaluationError> {
    contract.check()?;

    let mut result = validate(campaign);
    if !result.valid {
        return Err(EvaluationError::InvalidCampaign {
            errors: result.errors,
        });
    }

    let thresholds = SpeedThresholds::from(contract);
    debug!(
        normal_dl = thresholds.normal.download,
        peak_dl = thresholds.peak.download,
        min_dl = thresholds.minimum.download,
        "evaluating campaign"
    );

    let groups = DayGroups::new(campaign);
    let breakdown = assess(campaign, &groups, &thresholds);

    result.underperformance = breakdown.any_failed();
    result.reason = if result.underperformance {
        failure_reasons(&breakdown).join(REASON_SEPARATOR)
    } else {
        NO_UNDERPERFORMANCE.to_string()
    };

    let stats = &mut result.stats;
    stats.contract = Some(contract);
    stats.days_reaching_peak = PerDirection::new(
        breakdown.peak.download.days,
        breakdown.peak.upload.days,
    );
    stats.days_below_minimum = PerDirection::new(
        breakdown.floor.download.days,
        breakdown.floor.upload.days,
    );
    stats.percentage_normal = PerDirection::new(
        breakdown.aggregate.download.percentage,
        breakdown.aggregate.upload.percentage,
    );
    result.breakdown = Some(breakdown);

    info!(
        underperformance = result.underperformance,
        reason = %result.reason,
        "evaluation finished"
    );
    Ok(result)
}

fn assess(
    campaign: &[Measurement],
    groups: &DayGroups<'_>,
    thresholds: &SpeedThresholds,
) -> ConditionBreakdown {
    let days_reaching = thresholds.peak.map(|direction, &peak| {
        let days = groups
            .iter()
            .filter(|(_, ms)| ms.iter().any(|m| m.speed(direction) >= peak))
            .count();
        DayCountCheck {
            days,
            failed: days < rules::MIN_PEAK_DAYS,
        }
    });

    let total = campaign.len();
    let share = thresholds.normal.map(|direction, &normal| {
        let reaching = campaign
            .iter()
            .filter(|m| m.speed(direction) >= normal)
            .count();
        let percentage = if total == 0 {
            0.0
        } else {
            reaching as f64 / total as f64 * 100.0
        };
        ShareCheck {
            reaching,
            total,
            percentage,
            failed: percentage < rules::NORMAL_SHARE_PERCENT,
        }
    });

    let days_below = thresholds.minimum.map(|direction, &minimum| {
        let days = groups
            .iter()
            .filter(|(_, ms)| ms.iter().any(|m| m.speed(direction) < minimum))
            .count();
        DayCountCheck {
            days,
            failed: days >= rules::MAX_FLOOR_BREACH_DAYS,
        }
    });

    debug!(
        peak_dl = days_reaching.download.days,
        peak_ul = days_reaching.upload.days,
        normal_dl = share.download.percentage,
        normal_ul = share.upload.percentage,
        below_dl = days_below.download.days,
        below_ul = days_below.upload.days,
        "condition counts"
    );

    ConditionBreakdown {
        peak: Condition::new(
            "90% of contract speed on at least 2 of 3 days",
            days_reaching,
            |c| c.failed,
        ),
        aggregate: Condition::new(
            "Normally available speed in 90% of all measurements",
            share,
            |c| c.failed,
        ),
        floor: Condition::new(
            "Minimum speed undercut on 2 or more days",
            days_below,
            |c| c.failed,
        ),
    }
}

/// One clause per failing sub-condition, C1 to C3, download before upload
fn failure_reasons(breakdown: &ConditionBreakdown) -> Vec<String> {
    let mut reasons = Vec::new();

    for direction in Direction::ALL {
        let check = pick(&breakdown.peak, direction);
        if check.failed {
            reasons.push(format!(
                "{}: 90% reached on only {}/{} days",
                direction.label(),
                check.days,
                rules::REQUIRED_DAYS
            ));
        }
    }
    for direction in Direction::ALL {
        let check = pick(&breakdown.aggregate, direction);
        if check.failed {
            reasons.push(format!(
                "{}: {:.1}% of measurements at normal speed (required: {:.0}%)",
                direction.label(),
                check.percentage,
                rules::NORMAL_SHARE_PERCENT
            ));
        }
    }
    for direction in Direction::ALL {
        let check = pick(&breakdown.floor, direction);
        if check.failed {
            reasons.push(format!(
                "{}: minimum speed undercut on {} days",
                direction.label(),
                check.days
            ));
        }
    }

    reasons
}

#[inline]
fn pick<T>(condition: &Condition<T>, direction: Direction) -> &T {
    match direction {
        Direction::Download => &condition.download,
        Direction::Upload => &condition.upload,
    }
}
