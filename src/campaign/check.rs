//! End-to-end check: pick the campaign to judge, validate it, evaluate it

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::campaign::evaluator::{evaluate, EvaluationError};
use crate::campaign::result::{CampaignStats, ValidationResult};
use crate::campaign::rules;
use crate::campaign::selector::{select_subset, SelectionDiagnostics, SubsetOutcome};
use crate::campaign::validator::validate;
use crate::models::{ContractSpeeds, Measurement};

pub const CHECK_NOT_POSSIBLE: &str =
    "Check not possible: measurement plan requirements not met";

/// Where the judged campaign came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignSource {
    /// The pool itself is a valid campaign
    AsProvided,
    /// A compliant subset was selected from the pool
    Selected,
    /// Fewer than 30 measurements in the pool
    Insufficient,
    /// No compliant 3x10 subset exists in the pool
    NotConstructible,
}

impl CampaignSource {
    pub fn as_str(&self) -> &str {
        match self {
            CampaignSource::AsProvided => "as_provided",
            CampaignSource::Selected => "selected",
            CampaignSource::Insufficient => "insufficient",
            CampaignSource::NotConstructible => "not_constructible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub source: CampaignSource,
    pub contract: ContractSpeeds,
    /// Measurements the verdict is based on; empty if no campaign was judged
    pub campaign: Vec<Measurement>,
    pub result: ValidationResult,
    pub diagnostics: Option<SelectionDiagnostics>,
}

impl CheckReport {
    /// A verdict was actually computed
    pub fn evaluated(&self) -> bool {
        self.result.breakdown.is_some()
    }
}

/// Run the full check over a measurement pool.
///
/// The pool is judged as-is when it already forms a valid campaign;
/// otherwise the first compliant subset is judged.
pub fn run_check(
    pool: &[Measurement],
    contract: ContractSpeeds,
) -> Result<CheckReport, EvaluationError> {
    contract.check()?;

    if pool.len() < rules::REQUIRED_MEASUREMENTS {
        warn!(
            measurements = pool.len(),
            required = rules::REQUIRED_MEASUREMENTS,
            "too few measurements for a check"
        );
        let mut result = validate(pool);
        result.reason = CHECK_NOT_POSSIBLE.to_string();
        result.stats.contract = Some(contract);
        return Ok(CheckReport {
            source: CampaignSource::Insufficient,
            contract,
            campaign: Vec::new(),
            result,
            diagnostics: None,
        });
    }

    if validate(pool).valid {
        info!(measurements = pool.len(), "pool is a valid campaign");
        let result = evaluate(pool, contract)?;
        return Ok(CheckReport {
            source: CampaignSource::AsProvided,
            contract,
            campaign: pool.to_vec(),
            result,
            diagnostics: None,
        });
    }

    match select_subset(pool) {
        SubsetOutcome::Found(campaign) => {
            let result = evaluate(campaign.measurements(), contract)?;
            Ok(CheckReport {
                source: CampaignSource::Selected,
                contract,
                campaign: campaign.into_measurements(),
                result,
                diagnostics: None,
            })
        }
        SubsetOutcome::NotFound(diagnostics) => Ok(not_constructible(pool, contract, diagnostics)),
    }
}

fn not_constructible(
    pool: &[Measurement],
    contract: ContractSpeeds,
    diagnostics: SelectionDiagnostics,
) -> CheckReport {
    let mut stats = CampaignStats::snapshot(pool);
    stats.contract = Some(contract);

    let mut result = ValidationResult::new(stats);
    result.errors.push(format!(
        "No {} measurements on {} calendar days ({} each) within {} days with the required spacing could be formed.",
        rules::REQUIRED_MEASUREMENTS,
        rules::REQUIRED_DAYS,
        rules::MEASUREMENTS_PER_DAY,
        rules::MAX_SPAN_DAYS
    ));
    result.errors.push(format!(
        "Most populated days (measurement count): {}",
        diagnostics.busiest_days_label()
    ));
    result.reason = CHECK_NOT_POSSIBLE.to_string();

    CheckReport {
        source: CampaignSource::NotConstructible,
        contract,
        campaign: Vec::new(),
        result,
        diagnostics: Some(diagnostics),
    }
}

/// [`run_check`] on tokio's blocking pool, keeping the subset search off
/// the async executor
pub async fn check_in_background(
    pool: Vec<Measurement>,
    contract: ContractSpeeds,
) -> anyhow::Result<CheckReport> {
    let report = tokio::task::spawn_blocking(move || run_check(&pool, contract))
        .await
        .context("check task panicked")??;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::{campaign, campaign_with, day_of, pool_on_days};
    use chrono::Duration;

    fn contract() -> ContractSpeeds {
        ContractSpeeds::new(100.0, 40.0).unwrap()
    }

    #[test]
    fn test_valid_pool_judged_as_provided() {
        let pool = campaign([0, 2, 4]);
        let report = run_check(&pool, contract()).unwrap();
        assert_eq!(report.source, CampaignSource::AsProvided);
        assert!(report.evaluated());
        assert!(report.result.valid);
        assert!(!report.result.underperformance);
        assert_eq!(report.campaign, pool);
    }

    #[test]
    fn test_pool_with_spacing_warnings_is_kept() {
        // valid structure but a short 5th/6th pause: judged as-is with a warning
        let mut pool = campaign([0, 2, 4]);
        for m in pool.iter_mut().skip(5).take(5) {
            m.timestamp -= Duration::minutes(120);
        }
        let report = run_check(&pool, contract()).unwrap();
        assert_eq!(report.source, CampaignSource::AsProvided);
        assert_eq!(report.result.warnings.len(), 1);
    }

    #[test]
    fn test_subset_selected_from_larger_pool() {
        let mut pool = campaign_with([0, 2, 4], |_, _| (50.0, 40.0));
        // extra sparse days make the pool invalid as a whole
        pool.extend(pool_on_days(&[7, 9], 4));
        let report = run_check(&pool, contract()).unwrap();
        assert_eq!(report.source, CampaignSource::Selected);
        assert_eq!(report.campaign.len(), 30);
        assert!(report.result.valid);
        assert!(report.result.underperformance);
        assert!(report.campaign.iter().all(|m| m.timestamp.date() <= day_of(4)));
    }

    #[test]
    fn test_not_constructible_is_distinct() {
        let pool = pool_on_days(&[0, 1, 2, 3], 10);
        let report = run_check(&pool, contract()).unwrap();
        assert_eq!(report.source, CampaignSource::NotConstructible);
        assert!(!report.evaluated());
        assert!(!report.result.valid);
        assert!(!report.result.underperformance);
        assert_eq!(report.result.errors.len(), 2);
        assert!(report.result.errors[1].contains(&format!("{}: 10", day_of(0))));
        assert_eq!(report.result.reason, CHECK_NOT_POSSIBLE);
        assert_eq!(report.result.stats.total_measurements, 40);
        assert_eq!(report.result.stats.contract, Some(contract()));
        assert_eq!(report.diagnostics.as_ref().unwrap().day_count, 4);
    }

    #[test]
    fn test_insufficient_pool() {
        let pool = pool_on_days(&[0, 2], 10);
        let report = run_check(&pool, contract()).unwrap();
        assert_eq!(report.source, CampaignSource::Insufficient);
        assert!(report.result.errors[0].contains("found: 20"));
        assert_eq!(report.result.stats.statistics.count, 20);
    }

    #[test]
    fn test_invalid_contract() {
        let bad = ContractSpeeds {
            download: 100.0,
            upload: -1.0,
        };
        assert!(run_check(&campaign([0, 2, 4]), bad).is_err());
    }

    #[tokio::test]
    async fn test_background_check_matches_inline() {
        let pool = campaign([0, 3, 6]);
        let inline = run_check(&pool, contract()).unwrap();
        let background = check_in_background(pool, contract()).await.unwrap();
        assert_eq!(inline, background);
    }
}
