//! Measurement plan and verdict thresholds of the BNetzA procedure for
//! fixed-line connections.

use chrono::Duration;

/// Minimum total number of measurements in a campaign
pub const REQUIRED_MEASUREMENTS: usize = 30;

/// Distinct calendar days in a campaign
pub const REQUIRED_DAYS: usize = 3;

/// Measurements per calendar day
pub const MEASUREMENTS_PER_DAY: usize = 10;

/// Largest allowed difference between the first and last campaign day
pub const MAX_SPAN_DAYS: i64 = 14;

/// Smallest allowed difference between adjacent campaign days.
/// A difference of 2 leaves one full day without measurements in between.
pub const MIN_DAY_GAP: i64 = 2;

/// Index (0-based) of the measurement after which the long pause applies:
/// the pause sits between the 5th and 6th measurement of a day.
pub const LONG_PAUSE_AFTER: usize = 4;

/// Share of the contract speed that must be reached at least once a day
pub const PEAK_FACTOR: f64 = 0.9;

/// Share of the contract speed below which a measurement breaches the floor
pub const MINIMUM_FACTOR: f64 = 0.3;

/// Percentage of measurements that must reach the normally available speed
pub const NORMAL_SHARE_PERCENT: f64 = 90.0;

/// Days (out of three) that must reach the peak threshold
pub const MIN_PEAK_DAYS: usize = 2;

/// Days (out of three) with a floor breach that trigger underperformance
pub const MAX_FLOOR_BREACH_DAYS: usize = 2;

/// Default spacing between consecutive measurements of a day
pub fn min_spacing() -> Duration {
    Duration::minutes(5)
}

/// Spacing between the 5th and 6th measurement of a day
pub fn long_pause() -> Duration {
    Duration::minutes(180)
}

/// Gap required before admitting the measurement at position `chosen`
/// (number of measurements of the day already taken).
#[inline]
pub fn required_gap(chosen: usize) -> Duration {
    if chosen == LONG_PAUSE_AFTER + 1 {
        long_pause()
    } else {
        min_spacing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_is_consistent() {
        assert_eq!(REQUIRED_DAYS * MEASUREMENTS_PER_DAY, REQUIRED_MEASUREMENTS);
        assert!(LONG_PAUSE_AFTER + 1 < MEASUREMENTS_PER_DAY);
    }

    #[test]
    fn test_required_gap_only_long_before_sixth() {
        for chosen in 1..MEASUREMENTS_PER_DAY {
            let expected = if chosen == 5 { 180 } else { 5 };
            assert_eq!(required_gap(chosen).num_minutes(), expected, "chosen={chosen}");
        }
    }
}
