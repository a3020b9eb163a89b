//! Subset search for a compliant 3-day x 10-measurement campaign
//!
//! Candidate day triples are enumerated in lexicographic order over the
//! sorted day list. Triples that break the span or gap rules are skipped;
//! for the rest each day is filled greedily in chronological order. The
//! first triple that fills all three days wins.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::campaign::grouping::{day_diff, DayGroups};
use crate::campaign::rules;
use crate::models::Measurement;

/// Busiest days listed in selection diagnostics
const DIAGNOSTIC_DAYS: usize = 3;

/// A compliant 3x10 measurement set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub days: [NaiveDate; rules::REQUIRED_DAYS],
    /// First day's 10, then the second's, then the third's; each in time order
    pub measurements: Vec<Measurement>,
}

impl Campaign {
    #[inline]
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    /// Measurements of the `index`-th campaign day
    pub fn day(&self, index: usize) -> &[Measurement] {
        self.measurements
            .chunks(rules::MEASUREMENTS_PER_DAY)
            .nth(index)
            .unwrap_or(&[])
    }
}

/// Context reported when no campaign can be formed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionDiagnostics {
    pub pool_size: usize,
    pub day_count: usize,
    /// Triples that passed the span and gap rules
    pub candidate_triples: usize,
    /// Most populated days with their measurement counts
    pub busiest_days: Vec<(NaiveDate, usize)>,
}

impl SelectionDiagnostics {
    pub fn busiest_days_label(&self) -> String {
        if self.busiest_days.is_empty() {
            return "none".to_string();
        }
        self.busiest_days
            .iter()
            .map(|(day, count)| format!("{}: {}", day, count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubsetOutcome {
    Found(Campaign),
    NotFound(SelectionDiagnostics),
}

impl SubsetOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SubsetOutcome::Found(_))
    }

    pub fn campaign(&self) -> Option<&Campaign> {
        match self {
            SubsetOutcome::Found(campaign) => Some(campaign),
            SubsetOutcome::NotFound(_) => None,
        }
    }
}

/// Search the pool for the first compliant 3x10 campaign.
///
/// Deterministic: the result depends only on the measurements and their
/// timestamp order, never on thread scheduling.
pub fn select_subset(measurements: &[Measurement]) -> SubsetOutcome {
    let groups = DayGroups::new(measurements);
    let days = groups.days();

    let triples = if measurements.len() < rules::REQUIRED_MEASUREMENTS {
        Vec::new()
    } else {
        candidate_triples(&days)
    };
    debug!(
        pool = measurements.len(),
        days = days.len(),
        candidates = triples.len(),
        "searching for compliant subset"
    );

    let found = triples
        .par_iter()
        .find_map_first(|triple| fill_triple(&groups, *triple));

    match found {
        Some(campaign) => {
            info!(
                first = %campaign.days[0],
                second = %campaign.days[1],
                third = %campaign.days[2],
                "compliant subset selected"
            );
            SubsetOutcome::Found(campaign)
        }
        None => {
            let diagnostics = SelectionDiagnostics {
                pool_size: measurements.len(),
                day_count: days.len(),
                candidate_triples: triples.len(),
                busiest_days: groups.busiest_days(DIAGNOSTIC_DAYS),
            };
            info!(
                pool = diagnostics.pool_size,
                candidates = diagnostics.candidate_triples,
                busiest = %diagnostics.busiest_days_label(),
                "no compliant subset in pool"
            );
            SubsetOutcome::NotFound(diagnostics)
        }
    }
}

/// Day triples `d1 < d2 < d3` in lexicographic order that satisfy the
/// span and gap rules
fn candidate_triples(days: &[NaiveDate]) -> Vec<[NaiveDate; 3]> {
    let mut out = Vec::new();
    for (i, &d1) in days.iter().enumerate() {
        for (j, &d2) in days.iter().enumerate().skip(i + 1) {
            for &d3 in &days[j + 1..] {
                if day_diff(d1, d3) > rules::MAX_SPAN_DAYS {
                    continue;
                }
                if day_diff(d1, d2) < rules::MIN_DAY_GAP || day_diff(d2, d3) < rules::MIN_DAY_GAP {
                    continue;
                }
                out.push([d1, d2, d3]);
            }
        }
    }
    out
}

fn fill_triple(groups: &DayGroups<'_>, triple: [NaiveDate; 3]) -> Option<Campaign> {
    let mut measurements = Vec::with_capacity(rules::REQUIRED_MEASUREMENTS);
    for day in triple {
        let chosen = pick_day(groups.get(day))?;
        measurements.extend(chosen.into_iter().cloned());
    }
    Some(Campaign {
        days: triple,
        measurements,
    })
}

/// Greedy selection of 10 measurements from one chronologically sorted day.
///
/// A measurement is admitted when the gap to the last admitted one meets
/// the required spacing; the 6th admission needs the long pause.
fn pick_day<'a>(day: &[&'a Measurement]) -> Option<Vec<&'a Measurement>> {
    if day.len() < rules::MEASUREMENTS_PER_DAY {
        return None;
    }

    let mut chosen: Vec<&'a Measurement> = Vec::with_capacity(rules::MEASUREMENTS_PER_DAY);
    for &m in day {
        let admit = match chosen.last() {
            None => true,
            Some(last) => m.timestamp - last.timestamp >= rules::required_gap(chosen.len()),
        };
        if admit {
            chosen.push(m);
            if chosen.len() == rules::MEASUREMENTS_PER_DAY {
                return Some(chosen);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::{campaign, compliant_slots, day_of, pool_on_days};
    use crate::campaign::validator::validate;
    use chrono::Duration;

    /// A day with one measurement every 15 minutes from 06:00 to 21:45
    fn busy_day(offset: i64) -> Vec<Measurement> {
        let start = day_of(offset).and_hms_opt(6, 0, 0).unwrap();
        (0..64)
            .map(|i| Measurement::new(start + Duration::minutes(i * 15), 100.0, 40.0, 12.0))
            .collect()
    }

    #[test]
    fn test_valid_campaign_is_returned_unchanged() {
        let pool = campaign([0, 2, 4]);
        let outcome = select_subset(&pool);
        let selected = outcome.campaign().expect("campaign");
        assert_eq!(selected.days, [day_of(0), day_of(2), day_of(4)]);
        assert_eq!(selected.measurements(), pool.as_slice());
    }

    #[test]
    fn test_first_lexicographic_triple_wins() {
        let mut pool = Vec::new();
        for offset in 0..6 {
            pool.extend(busy_day(offset));
        }
        let outcome = select_subset(&pool);
        let selected = outcome.campaign().expect("campaign");
        assert_eq!(selected.days, [day_of(0), day_of(2), day_of(4)]);
        assert_eq!(selected.measurements.len(), 30);

        let check = validate(selected.measurements());
        assert!(check.valid, "{:?}", check.errors);
        assert!(check.warnings.is_empty(), "{:?}", check.warnings);
    }

    #[test]
    fn test_greedy_pick_respects_long_pause() {
        let pool = busy_day(0);
        let groups = DayGroups::new(&pool);
        let chosen = pick_day(groups.get(day_of(0))).expect("ten picks");
        let minutes: Vec<i64> = chosen
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_minutes())
            .collect();
        assert_eq!(minutes, vec![15, 15, 15, 15, 180, 15, 15, 15, 15]);
    }

    #[test]
    fn test_day_without_long_pause_is_rejected() {
        // 12 measurements within two hours never allow the 180 minute pause
        let pool = pool_on_days(&[0, 2, 4], 12);
        match select_subset(&pool) {
            SubsetOutcome::NotFound(diag) => {
                assert_eq!(diag.pool_size, 36);
                assert_eq!(diag.day_count, 3);
                assert_eq!(diag.candidate_triples, 1);
                assert_eq!(diag.busiest_days.len(), 3);
                assert_eq!(diag.busiest_days[0], (day_of(0), 12));
            }
            SubsetOutcome::Found(c) => panic!("unexpected campaign on {:?}", c.days),
        }
    }

    #[test]
    fn test_close_measurements_are_skipped() {
        // duplicate every slot one minute later; the extras must be skipped
        let mut pool = Vec::new();
        for offset in [0, 3, 6] {
            for ts in compliant_slots(day_of(offset)) {
                pool.push(Measurement::new(ts, 100.0, 40.0, 10.0));
                pool.push(Measurement::new(ts + Duration::minutes(1), 1.0, 1.0, 10.0));
            }
        }
        let outcome = select_subset(&pool);
        let selected = outcome.campaign().expect("campaign");
        assert!(selected.measurements.iter().all(|m| m.download == 100.0));
        assert_eq!(selected.day(1)[0].timestamp, compliant_slots(day_of(3))[0]);
    }

    #[test]
    fn test_span_and_gap_pruning() {
        let mut pool = Vec::new();
        for offset in [0, 1, 16] {
            pool.extend(busy_day(offset));
        }
        let outcome = select_subset(&pool);
        match outcome {
            SubsetOutcome::NotFound(diag) => {
                assert_eq!(diag.candidate_triples, 0);
                assert_eq!(diag.busiest_days_label().matches(": 64").count(), 3);
            }
            SubsetOutcome::Found(_) => panic!("no triple satisfies span and gap"),
        }
    }

    #[test]
    fn test_small_pool_not_found() {
        let pool = pool_on_days(&[0, 2], 14);
        let outcome = select_subset(&pool);
        assert!(!outcome.is_found());
    }

    #[test]
    fn test_empty_pool_diagnostics() {
        match select_subset(&[]) {
            SubsetOutcome::NotFound(diag) => {
                assert_eq!(diag, SelectionDiagnostics::default());
                assert_eq!(diag.busiest_days_label(), "none");
            }
            SubsetOutcome::Found(_) => panic!("empty pool"),
        }
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut pool = Vec::new();
        for offset in [1, 4, 5, 9, 12] {
            pool.extend(busy_day(offset));
        }
        let forward = select_subset(&pool);
        pool.reverse();
        let backward = select_subset(&pool);
        assert_eq!(forward, backward);
        assert_eq!(
            forward.campaign().unwrap().days,
            [day_of(1), day_of(4), day_of(9)]
        );
    }

    #[test]
    fn test_uneven_pool_over_twenty_days() {
        // 20 days: most too sparse, a few dense enough to form the campaign
        let mut pool = Vec::new();
        for offset in 0..20 {
            if [5, 8, 13].contains(&offset) {
                pool.extend(busy_day(offset));
            } else {
                pool.extend(pool_on_days(&[offset], (offset % 7) as usize + 3));
            }
        }
        let whole = validate(&pool);
        assert!(!whole.valid);
        assert!(whole.errors[0].contains("found: 20"));

        let outcome = select_subset(&pool);
        let selected = outcome.campaign().expect("campaign");
        assert_eq!(selected.days, [day_of(5), day_of(8), day_of(13)]);
        assert!(validate(selected.measurements()).valid);
    }
}
