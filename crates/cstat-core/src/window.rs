//! Analysis windows and the time-range filter.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::observation::{Measurement, Observation};

/// An inclusive `[start, end]` timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Both bounds are inclusive.
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// The window options exposed by the front end.
///
/// Selection happens outside the core; only the resolved window reaches the
/// analysis. `All` resolves to no window at all, which leaves streams
/// unfiltered rather than clamping to the data extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSelection {
    All,
    Today,
    LastWeek,
    LastMonth,
    LastYear,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl WindowSelection {
    /// Resolves the selection against a reference "now".
    #[must_use]
    pub fn resolve(&self, now: NaiveDateTime) -> Option<TimeWindow> {
        match self {
            Self::All => None,
            Self::Today => Some(TimeWindow {
                start: start_of_day(now.date()),
                end: end_of_day(now.date()),
            }),
            Self::LastWeek => Some(TimeWindow {
                start: now - Duration::days(7),
                end: now,
            }),
            Self::LastMonth => Some(TimeWindow {
                start: now - Duration::days(30),
                end: now,
            }),
            Self::LastYear => Some(TimeWindow {
                start: now - Duration::days(365),
                end: now,
            }),
            Self::Custom { from, to } => Some(TimeWindow {
                start: start_of_day(*from),
                end: end_of_day(*to),
            }),
        }
    }
}

/// Midnight at the start of the given date.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// The last representable instant of the given date (23:59:59.999999).
#[must_use]
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap())
}

/// Restricts observations to the window, preserving order.
///
/// With no window the input passes through unchanged.
#[must_use]
pub fn filter_observations(
    observations: &[Observation],
    window: Option<&TimeWindow>,
) -> Vec<Observation> {
    match window {
        None => observations.to_vec(),
        Some(w) => observations
            .iter()
            .copied()
            .filter(|o| w.contains(o.timestamp))
            .collect(),
    }
}

/// Restricts continuous samples to the window, preserving order.
#[must_use]
pub fn filter_measurements(
    samples: &[Measurement],
    window: Option<&TimeWindow>,
) -> Vec<Measurement> {
    match window {
        None => samples.to_vec(),
        Some(w) => samples
            .iter()
            .copied()
            .filter(|m| w.contains(m.timestamp))
            .collect(),
    }
}
