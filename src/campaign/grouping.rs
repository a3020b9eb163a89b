//! Calendar-day grouping of measurement pools

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::Measurement;

/// Measurements bucketed by calendar day.
///
/// Days iterate in ascending order. Within a day, measurements are sorted
/// by timestamp; equal timestamps keep their input order.
#[derive(Debug, Clone, Default)]
pub struct DayGroups<'a> {
    by_day: BTreeMap<NaiveDate, Vec<&'a Measurement>>,
}

impl<'a> DayGroups<'a> {
    pub fn new<I>(measurements: I) -> Self
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut by_day: BTreeMap<NaiveDate, Vec<&'a Measurement>> = BTreeMap::new();
        for m in measurements {
            by_day.entry(m.day()).or_default().push(m);
        }
        for day in by_day.values_mut() {
            day.sort_by_key(|m| m.timestamp);
        }
        Self { by_day }
    }

    /// Number of distinct days
    #[inline]
    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Distinct days, ascending
    pub fn days(&self) -> Vec<NaiveDate> {
        self.by_day.keys().copied().collect()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.by_day.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.by_day.keys().next_back().copied()
    }

    /// Chronologically sorted measurements of `day`
    pub fn get(&self, day: NaiveDate) -> &[&'a Measurement] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[&'a Measurement])> + '_ {
        self.by_day.iter().map(|(day, ms)| (*day, ms.as_slice()))
    }

    /// The `n` most populated days: count descending, earlier day first on ties
    pub fn busiest_days(&self, n: usize) -> Vec<(NaiveDate, usize)> {
        let mut counts: Vec<(NaiveDate, usize)> =
            self.by_day.iter().map(|(day, ms)| (*day, ms.len())).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        counts.truncate(n);
        counts
    }
}

/// Whole calendar days from `from` to `to`
#[inline]
pub fn day_diff(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
