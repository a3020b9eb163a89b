//! Structural validation of a measurement campaign
//!
//! Tiers run in order and stop at the first tier that reports anything:
//!
//! 1. at least 30 measurements
//! 2. exactly 3 calendar days
//! 3. exactly 10 measurements per day
//! 4. first to last day at most 14 days apart
//! 5. adjacent days at least 2 days apart
//!
//! Intra-day spacing (5 minutes, 180 minutes between the 5th and 6th
//! measurement) is checked last and only produces warnings.

use tracing::debug;

use crate::campaign::grouping::{day_diff, DayGroups};
use crate::campaign::result::{CampaignStats, ValidationResult};
use crate::campaign::rules;
use crate::models::Measurement;

/// Validate the structure of a campaign.
///
/// `stats` is filled over the whole input on every return path.
pub fn validate(measurements: &[Measurement]) -> ValidationResult {
    let groups = DayGroups::new(measurements);
    let mut result = ValidationResult::new(CampaignStats::from_groups(measurements, &groups));

    if let Err(errors) = check_structure(measurements.len(), &groups) {
        debug!(
            measurements = measurements.len(),
            days = groups.len(),
            errors = errors.len(),
            "campaign structurally invalid"
        );
        result.errors = errors;
        return result;
    }

    result.warnings = spacing_warnings(&groups);
    result.valid = true;
    debug!(
        warnings = result.warnings.len(),
        "campaign structurally valid (3 days x 10 measurements)"
    );
    result
}

/// Tiers 1-5. Returns every failure of the first failing tier.
pub(crate) fn check_structure(total: usize, groups: &DayGroups<'_>) -> Result<(), Vec<String>> {
    if total < rules::REQUIRED_MEASUREMENTS {
        return Err(vec![format!(
            "At least {} measurements are required, found: {}",
            rules::REQUIRED_MEASUREMENTS,
            total
        )]);
    }

    if groups.len() != rules::REQUIRED_DAYS {
        return Err(vec![format!(
            "Exactly {} distinct calendar days are required, found: {}",
            rules::REQUIRED_DAYS,
            groups.len()
        )]);
    }

    let per_day: Vec<String> = groups
        .iter()
        .filter(|(_, ms)| ms.len() != rules::MEASUREMENTS_PER_DAY)
        .map(|(day, ms)| {
            format!(
                "Day {}: {} measurements found (required: {})",
                day,
                ms.len(),
                rules::MEASUREMENTS_PER_DAY
            )
        })
        .collect();
    if !per_day.is_empty() {
        return Err(per_day);
    }

    let days = groups.days();
    if let (Some(&first), Some(&last)) = (days.first(), days.last()) {
        let span = day_diff(first, last);
        if span > rules::MAX_SPAN_DAYS {
            return Err(vec![format!(
                "Measurements spread over {} days (max. {} days)",
                span,
                rules::MAX_SPAN_DAYS
            )]);
        }
    }

    let gaps: Vec<String> = days
        .windows(2)
        .filter_map(|pair| {
            let gap = day_diff(pair[0], pair[1]);
            (gap < rules::MIN_DAY_GAP).then(|| {
                format!(
                    "Gap between day {} and {}: {} day(s) (required: at least {})",
                    pair[0],
                    pair[1],
                    gap - 1,
                    rules::MIN_DAY_GAP - 1
                )
            })
        })
        .collect();
    if !gaps.is_empty() {
        return Err(gaps);
    }

    Ok(())
}

/// Tier 6: spacing between consecutive measurements of each day
pub(crate) fn spacing_warnings(groups: &DayGroups<'_>) -> Vec<String> {
    let mut warnings = Vec::new();
    for (day, ms) in groups.iter() {
        for (i, pair) in ms.windows(2).enumerate() {
            let gap = pair[1].timestamp - pair[0].timestamp;
            let required = rules::required_gap(i + 1);
            if gap >= required {
                continue;
            }
            let minutes = gap.num_seconds() as f64 / 60.0;
            if i == rules::LONG_PAUSE_AFTER {
                warnings.push(format!(
                    "Day {}: gap between measurement {} and {}: {:.0} min (required: {} min)",
                    day,
                    i + 1,
                    i + 2,
                    minutes,
                    required.num_minutes()
                ));
            } else {
                warnings.push(format!(
                    "Day {}: gap between measurement {} and {}: {:.1} min (required: {} min)",
                    day,
                    i + 1,
                    i + 2,
                    minutes,
                    required.num_minutes()
                ));
            }
        }
    }
    warnings
}
