//! Core domain logic for contact sensor statistics.
//!
//! This crate contains the fundamental types and logic for:
//! - Session extraction: reconstructing open sessions from binary streams
//! - Daily aggregation: per-day open/closed minute totals
//! - Summary statistics: per-device and cross-device reductions
//! - Window alignment: padding series for joint step plotting

pub mod align;
pub mod daily;
pub mod extract;
pub mod observation;
pub mod stats;
pub mod window;

pub use align::align_to_window;
pub use daily::{DailyBucket, MINUTES_PER_DAY, daily_buckets};
pub use extract::{Extraction, ExtractorConfig, Session, extract_sessions};
pub use observation::{
    ContactState, ContactStream, EventStream, Measurement, MeasurementStream, Observation,
    StreamKind, UnknownStateLabel,
};
pub use stats::{
    OverallStatistics, StatisticsSummary, StatsError, analyze_stream, overall_statistics,
    summarize,
};
pub use window::{TimeWindow, WindowSelection, filter_measurements, filter_observations};
