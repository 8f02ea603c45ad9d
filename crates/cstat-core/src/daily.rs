//! Per-day open/closed aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Open/closed minute totals for one calendar day.
///
/// A day is only represented when at least one session closed on it.
/// `closed_minutes` is derived as `1440 − open_minutes` and is deliberately
/// left unclamped: if open-minute accounting overshoots a full day the
/// closed total goes negative rather than being silently fixed up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub open_minutes: f64,
    pub closed_minutes: f64,
}

/// Builds one bucket per date key, in date order.
#[must_use]
pub fn daily_buckets(daily_minutes: &BTreeMap<NaiveDate, f64>) -> Vec<DailyBucket> {
    daily_minutes
        .iter()
        .map(|(&date, &open_minutes)| DailyBucket {
            date,
            open_minutes,
            closed_minutes: MINUTES_PER_DAY - open_minutes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_closed_minutes_sum_to_a_full_day() {
        let mut minutes = BTreeMap::new();
        minutes.insert("2024-03-01".parse().unwrap(), 30.0);
        minutes.insert("2024-03-02".parse().unwrap(), 720.0);

        let buckets = daily_buckets(&minutes);
        assert_eq!(buckets.len(), 2);
        for bucket in &buckets {
            assert!((bucket.open_minutes + bucket.closed_minutes - MINUTES_PER_DAY).abs() < 1e-9);
        }
        assert!((buckets[0].closed_minutes - 1410.0).abs() < 1e-9);
    }

    #[test]
    fn buckets_come_out_in_date_order() {
        let mut minutes = BTreeMap::new();
        minutes.insert("2024-03-05".parse().unwrap(), 10.0);
        minutes.insert("2024-03-01".parse().unwrap(), 20.0);

        let buckets = daily_buckets(&minutes);
        assert_eq!(buckets[0].date, "2024-03-01".parse().unwrap());
        assert_eq!(buckets[1].date, "2024-03-05".parse().unwrap());
    }

    #[test]
    fn overshooting_open_minutes_drive_closed_negative() {
        // Two near-maximal sessions closing on the same day can exceed 1440
        // accumulated open minutes; the derived closed total goes negative.
        let mut minutes = BTreeMap::new();
        minutes.insert("2024-03-01".parse().unwrap(), 2000.0);

        let buckets = daily_buckets(&minutes);
        assert!((buckets[0].closed_minutes - (-560.0)).abs() < 1e-9);
    }

    #[test]
    fn no_dates_no_buckets() {
        assert!(daily_buckets(&BTreeMap::new()).is_empty());
    }
}
