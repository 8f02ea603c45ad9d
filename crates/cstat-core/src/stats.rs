//! Per-device summary statistics and the multi-device reduction.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::daily::daily_buckets;
use crate::extract::{Extraction, ExtractorConfig, extract_sessions};
use crate::observation::ContactStream;
use crate::window::{TimeWindow, filter_observations};

/// Statistics errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// The overall reduction is only defined across two or more devices.
    #[error("overall statistics require at least two summaries, got {count}")]
    InsufficientSummaries { count: usize },
}

/// Summary statistics for one device over one window.
///
/// The means over daily buckets are `None` when no day had a completed
/// session; `mean_session_duration_minutes` is 0 in that case, not
/// undefined. `day_count` spans the whole window regardless of how many
/// buckets were produced, while `mean_sessions_per_day` divides by the
/// number of days that actually had a completed session. That asymmetry is
/// intentional: a dangling open still counts as usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub accessory_name: String,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Calendar days in the window, both endpoints included.
    pub day_count: i64,
    pub mean_open_minutes_per_day: Option<f64>,
    pub mean_closed_minutes_per_day: Option<f64>,
    pub mean_sessions_per_day: f64,
    pub mean_session_duration_minutes: f64,
}

/// Field-wise mean of summaries across devices.
///
/// Identity fields (`accessory_name`, window bounds, `day_count`) are
/// dropped; only the four numeric means are reduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStatistics {
    pub mean_open_minutes_per_day: Option<f64>,
    pub mean_closed_minutes_per_day: Option<f64>,
    pub mean_sessions_per_day: f64,
    pub mean_session_duration_minutes: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Reduces one extraction run into summary statistics.
#[expect(
    clippy::cast_precision_loss,
    reason = "bucket and session counts are tiny relative to f64 precision"
)]
#[must_use]
pub fn summarize(
    accessory_name: &str,
    extraction: &Extraction,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> StatisticsSummary {
    let buckets = daily_buckets(&extraction.daily_minutes);

    let mean_sessions_per_day = if buckets.is_empty() {
        0.0
    } else {
        f64::from(extraction.open_session_count) / buckets.len() as f64
    };

    let mean_session_duration_minutes = if extraction.sessions.is_empty() {
        0.0
    } else {
        extraction
            .sessions
            .iter()
            .map(|s| s.duration_minutes)
            .sum::<f64>()
            / extraction.sessions.len() as f64
    };

    StatisticsSummary {
        accessory_name: accessory_name.to_string(),
        window_start,
        window_end,
        day_count: (window_end.date() - window_start.date()).num_days() + 1,
        mean_open_minutes_per_day: mean(buckets.iter().map(|b| b.open_minutes)),
        mean_closed_minutes_per_day: mean(buckets.iter().map(|b| b.closed_minutes)),
        mean_sessions_per_day,
        mean_session_duration_minutes,
    }
}

/// Filters, extracts, and summarizes one contact stream.
///
/// When no window was requested the stream's own first/last timestamps
/// stand in for the window bounds. Returns `None` only when neither a
/// window nor any observation exists, leaving nothing to report on.
#[must_use]
pub fn analyze_stream(
    stream: &ContactStream,
    window: Option<&TimeWindow>,
    config: &ExtractorConfig,
) -> Option<StatisticsSummary> {
    let (window_start, window_end) = match window {
        Some(w) => (w.start, w.end),
        None => stream.extent()?,
    };

    let filtered = filter_observations(&stream.observations, window);
    let extraction = extract_sessions(&filtered, config);

    Some(summarize(
        &stream.accessory_name,
        &extraction,
        window_start,
        window_end,
    ))
}

/// Averages summaries across devices.
///
/// Undefined per-device means are skipped rather than poisoning the
/// average. Requires at least two summaries; a single device has no
/// "overall" to compute.
pub fn overall_statistics(
    summaries: &[StatisticsSummary],
) -> Result<OverallStatistics, StatsError> {
    if summaries.len() < 2 {
        return Err(StatsError::InsufficientSummaries {
            count: summaries.len(),
        });
    }

    Ok(OverallStatistics {
        mean_open_minutes_per_day: mean(
            summaries.iter().filter_map(|s| s.mean_open_minutes_per_day),
        ),
        mean_closed_minutes_per_day: mean(
            summaries
                .iter()
                .filter_map(|s| s.mean_closed_minutes_per_day),
        ),
        // These two fields are defined for every summary, so the mean over a
        // non-empty slice is always Some.
        mean_sessions_per_day: mean(summaries.iter().map(|s| s.mean_sessions_per_day))
            .unwrap_or(0.0),
        mean_session_duration_minutes: mean(
            summaries.iter().map(|s| s.mean_session_duration_minutes),
        )
        .unwrap_or(0.0),
    })
}
