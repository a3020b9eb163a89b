//! Fixture builders shared by the campaign unit tests

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::Measurement;

pub fn day_of(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap() + Duration::days(offset)
}

/// Ten compliant slots: 08:00..08:40 every 10 min, then 11:40..12:20
pub fn compliant_slots(day: NaiveDate) -> Vec<NaiveDateTime> {
    let start = day.and_hms_opt(8, 0, 0).unwrap();
    (0..10i64)
        .map(|i| {
            let pause = if i >= 5 { 170 } else { 0 };
            start + Duration::minutes(i * 10 + pause)
        })
        .collect()
}

/// Compliant 3x10 campaign; `speeds(day_index, slot)` gives (download, upload)
pub fn campaign_with(days: [i64; 3], speeds: impl Fn(usize, usize) -> (f64, f64)) -> Vec<Measurement> {
    let mut out = Vec::with_capacity(30);
    for (d, offset) in days.iter().enumerate() {
        for (slot, ts) in compliant_slots(day_of(*offset)).into_iter().enumerate() {
            let (download, upload) = speeds(d, slot);
            out.push(Measurement::new(ts, download, upload, 15.0));
        }
    }
    out
}

pub fn campaign(days: [i64; 3]) -> Vec<Measurement> {
    campaign_with(days, |_, _| (100.0, 40.0))
}

/// `per_day` measurements on each day, 10 minutes apart from 08:00
pub fn pool_on_days(days: &[i64], per_day: usize) -> Vec<Measurement> {
    let mut out = Vec::new();
    for offset in days {
        let start = day_of(*offset).and_hms_opt(8, 0, 0).unwrap();
        for i in 0..per_day {
            let ts = start + Duration::minutes(i as i64 * 10);
            out.push(Measurement::new(ts, 100.0, 40.0, 15.0));
        }
    }
    out
}
