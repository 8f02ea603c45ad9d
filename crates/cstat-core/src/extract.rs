//! Open-session reconstruction from a contact stream.
//!
//! A single forward pass over the sorted observations drives an explicit
//! `Idle | Pending` state machine and threads an [`Extraction`] accumulator
//! through the fold. Nothing here is shared across streams, so extraction
//! runs for different devices can proceed in parallel.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::observation::{ContactState, Observation};

/// Realism bounds used to discard sensor-glitch readings.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// A repeated "open" more than this long after the pending open is
    /// treated as a measurement error.
    pub max_reopen_gap: Duration,
    /// Sessions longer than this many minutes are discarded.
    pub max_session_minutes: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_reopen_gap: Duration::hours(24),
            max_session_minutes: 1440.0,
        }
    }
}

/// One reconstructed open-to-close interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub open_at: NaiveDateTime,
    pub duration_minutes: f64,
}

/// Everything one extraction pass produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Completed sessions, in close order.
    pub sessions: Vec<Session>,
    /// Accumulated open minutes keyed by each session's close date.
    pub daily_minutes: BTreeMap<NaiveDate, f64>,
    /// Count of opened sessions, including ones that never closed or whose
    /// close fell outside the realism bound.
    pub open_session_count: u32,
}

/// Scan state: either no session is pending, or one opened at the given time.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    Idle,
    Pending(NaiveDateTime),
}

#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond counts here are far below f64's exact integer range"
)]
fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

/// Reconstructs open sessions from a sorted binary stream.
///
/// Observations must be sorted by timestamp ascending. The pass is a pure
/// fold: running it twice on the same input yields identical results.
///
/// Two deliberate quirks of the accounting:
/// - a repeated "open" arriving more than `max_reopen_gap` after the pending
///   open discards the pending session *without* starting a new one;
/// - a session still pending at end of stream is dropped, but its open has
///   already been counted in `open_session_count`.
#[must_use]
pub fn extract_sessions(observations: &[Observation], config: &ExtractorConfig) -> Extraction {
    let mut state = ScanState::Idle;
    let mut extraction = Extraction::default();

    for obs in observations {
        match (obs.state, state) {
            (ContactState::Open, ScanState::Pending(open_at)) => {
                if obs.timestamp - open_at > config.max_reopen_gap {
                    // Stray reopen after an implausible gap: drop the pending
                    // session and skip this event entirely.
                    tracing::trace!(
                        open_at = %open_at,
                        reopen_at = %obs.timestamp,
                        "discarding pending session after implausible gap"
                    );
                    state = ScanState::Idle;
                }
                // Within the gap bound, repeated opens coalesce into the
                // pending session.
            }
            (ContactState::Open, ScanState::Idle) => {
                state = ScanState::Pending(obs.timestamp);
                extraction.open_session_count += 1;
            }
            (ContactState::Closed, ScanState::Pending(open_at)) => {
                let duration = minutes_between(open_at, obs.timestamp);
                if duration <= config.max_session_minutes {
                    extraction.sessions.push(Session {
                        open_at,
                        duration_minutes: duration,
                    });
                    // Attributed to the close date, even across midnight.
                    *extraction
                        .daily_minutes
                        .entry(obs.timestamp.date())
                        .or_insert(0.0) += duration;
                } else {
                    tracing::trace!(
                        open_at = %open_at,
                        duration_minutes = duration,
                        "discarding implausibly long session"
                    );
                }
                state = ScanState::Idle;
            }
            (ContactState::Closed, ScanState::Idle) => {}
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ts: &str, state: ContactState) -> Observation {
        Observation {
            timestamp: ts.parse().unwrap(),
            state,
        }
    }

    fn open(ts: &str) -> Observation {
        obs(ts, ContactState::Open)
    }

    fn closed(ts: &str) -> Observation {
        obs(ts, ContactState::Closed)
    }

    fn extract(observations: &[Observation]) -> Extraction {
        extract_sessions(observations, &ExtractorConfig::default())
    }

    #[test]
    fn single_session_thirty_minutes() {
        let result = extract(&[open("2024-03-01T09:00:00"), closed("2024-03-01T09:30:00")]);

        assert_eq!(result.sessions.len(), 1);
        assert!((result.sessions[0].duration_minutes - 30.0).abs() < 1e-9);
        assert_eq!(result.open_session_count, 1);
        let day: NaiveDate = "2024-03-01".parse().unwrap();
        assert!((result.daily_minutes[&day] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn midnight_session_attributed_to_close_date() {
        let result = extract(&[open("2024-03-01T23:50:00"), closed("2024-03-02T00:10:00")]);

        assert_eq!(result.sessions.len(), 1);
        assert!((result.sessions[0].duration_minutes - 20.0).abs() < 1e-9);
        let close_day: NaiveDate = "2024-03-02".parse().unwrap();
        assert_eq!(result.daily_minutes.len(), 1);
        assert!((result.daily_minutes[&close_day] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_opens_coalesce_into_one_session() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            open("2024-03-01T09:05:00"),
            closed("2024-03-01T09:30:00"),
        ]);

        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.open_session_count, 1);
        // Duration runs from the first open.
        assert!((result.sessions[0].duration_minutes - 30.0).abs() < 1e-9);
    }

    #[test]
    fn reopen_at_exactly_24h_keeps_session_pending() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            open("2024-03-02T09:00:00"),
            closed("2024-03-02T09:30:00"),
        ]);

        // Gap is exactly 24h, so the pending session survives and closes
        // with an implausible 1470 minute duration, which is then dropped
        // by the session cap.
        assert_eq!(result.open_session_count, 1);
        assert!(result.sessions.is_empty());
        assert!(result.daily_minutes.is_empty());
    }

    #[test]
    fn reopen_past_24h_discards_without_reopening() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            open("2024-03-02T09:00:01"),
            closed("2024-03-02T09:30:00"),
        ]);

        // The stray reopen is dropped entirely: no new session starts, so
        // the close that follows is a no-op.
        assert_eq!(result.open_session_count, 1);
        assert!(result.sessions.is_empty());
        assert!(result.daily_minutes.is_empty());
    }

    #[test]
    fn session_longer_than_a_day_is_discarded() {
        let result = extract(&[open("2024-03-01T09:00:00"), closed("2024-03-02T09:00:01")]);

        assert_eq!(result.open_session_count, 1);
        assert!(result.sessions.is_empty());
        assert!(result.daily_minutes.is_empty());
    }

    #[test]
    fn session_of_exactly_1440_minutes_is_kept() {
        let result = extract(&[open("2024-03-01T09:00:00"), closed("2024-03-02T09:00:00")]);

        assert_eq!(result.sessions.len(), 1);
        assert!((result.sessions[0].duration_minutes - 1440.0).abs() < 1e-9);
    }

    #[test]
    fn close_while_idle_is_a_no_op() {
        let result = extract(&[
            closed("2024-03-01T08:00:00"),
            open("2024-03-01T09:00:00"),
            closed("2024-03-01T09:30:00"),
            closed("2024-03-01T10:00:00"),
        ]);

        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.open_session_count, 1);
    }

    #[test]
    fn pending_session_at_end_of_stream_counts_as_open() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            closed("2024-03-01T09:30:00"),
            open("2024-03-01T10:00:00"),
        ]);

        // The trailing open never closes: no session, no daily minutes,
        // but the open counter includes it.
        assert_eq!(result.sessions.len(), 1);
        assert_eq!(result.open_session_count, 2);
    }

    #[test]
    fn daily_minutes_sum_to_session_durations() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            closed("2024-03-01T09:30:00"),
            open("2024-03-01T23:50:00"),
            closed("2024-03-02T00:10:00"),
            open("2024-03-02T12:00:00"),
            closed("2024-03-02T12:45:00"),
        ]);

        let session_total: f64 = result.sessions.iter().map(|s| s.duration_minutes).sum();
        let daily_total: f64 = result.daily_minutes.values().sum();
        assert!((session_total - daily_total).abs() < 1e-9);
        assert_eq!(result.daily_minutes.len(), 2);
    }

    #[test]
    fn extraction_is_idempotent() {
        let observations = [
            open("2024-03-01T09:00:00"),
            open("2024-03-01T09:05:00"),
            closed("2024-03-01T09:30:00"),
            open("2024-03-03T10:00:00"),
            closed("2024-03-03T11:00:00"),
            open("2024-03-04T12:00:00"),
        ];

        assert_eq!(extract(&observations), extract(&observations));
    }

    #[test]
    fn empty_stream_yields_empty_extraction() {
        let result = extract(&[]);
        assert!(result.sessions.is_empty());
        assert!(result.daily_minutes.is_empty());
        assert_eq!(result.open_session_count, 0);
    }

    #[test]
    fn sub_second_precision_survives() {
        let result = extract(&[
            open("2024-03-01T09:00:00"),
            closed("2024-03-01T09:00:30.500"),
        ]);

        assert_eq!(result.sessions.len(), 1);
        assert!((result.sessions[0].duration_minutes - 0.508_333_333).abs() < 1e-6);
    }
}
