//! Report command: per-device statistics and the overall reduction.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use cstat_core::{
    EventStream, OverallStatistics, StatisticsSummary, TimeWindow, WindowSelection,
    analyze_stream, overall_statistics,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::Config;
use crate::loader;

/// Everything one report run produced.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub summaries: Vec<StatisticsSummary>,
    /// Mean over all devices; only present for two or more summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallStatistics>,
    /// Files whose stream could not be used, with the reason.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

/// One unusable input file.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub reason: String,
}

fn load_contact_summary(
    path: &Path,
    window: Option<&TimeWindow>,
    config: &Config,
) -> Result<Option<StatisticsSummary>> {
    let stream = loader::load_stream(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    match stream {
        EventStream::Contact(contact) => {
            Ok(analyze_stream(&contact, window, &config.extractor()))
        }
        EventStream::Continuous(continuous) => bail!(
            "{} carries a continuous {} series, not a contact stream",
            path.display(),
            continuous.measurement
        ),
    }
}

/// Loads every file and reduces the batch.
///
/// Each device file is independent, so loading and extraction fan out
/// across files; a stream that fails to load is reported and skipped
/// without disturbing the others.
pub fn gather(
    files: &[PathBuf],
    window: Option<&TimeWindow>,
    config: &Config,
) -> Result<ReportData> {
    if files.len() > config.max_files {
        bail!(
            "got {} files, the maximum per run is {}",
            files.len(),
            config.max_files
        );
    }

    let results: Vec<(&PathBuf, Result<Option<StatisticsSummary>>)> = files
        .par_iter()
        .map(|path| (path, load_contact_summary(path, window, config)))
        .collect();

    let mut summaries = Vec::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(Some(summary)) => summaries.push(summary),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "empty stream with no window, nothing to report");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unusable stream");
                failures.push(FileFailure {
                    file: path.clone(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    let overall = if summaries.len() >= 2 {
        Some(overall_statistics(&summaries)?)
    } else {
        None
    };

    Ok(ReportData {
        summaries,
        overall,
        failures,
    })
}

fn fmt_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    for summary in &data.summaries {
        writeln!(output, "STATISTICS: {}", summary.accessory_name).unwrap();
        writeln!(
            output,
            "  From:                           {}",
            summary.window_start.format("%Y-%m-%d %H:%M:%S")
        )
        .unwrap();
        writeln!(
            output,
            "  To:                             {}",
            summary.window_end.format("%Y-%m-%d %H:%M:%S")
        )
        .unwrap();
        writeln!(
            output,
            "  Number of days:                 {}",
            summary.day_count
        )
        .unwrap();
        writeln!(
            output,
            "  Mean minutes open per day:      {}",
            fmt_mean(summary.mean_open_minutes_per_day)
        )
        .unwrap();
        writeln!(
            output,
            "  Mean minutes closed per day:    {}",
            fmt_mean(summary.mean_closed_minutes_per_day)
        )
        .unwrap();
        writeln!(
            output,
            "  Mean opening sessions per day:  {:.1}",
            summary.mean_sessions_per_day
        )
        .unwrap();
        writeln!(
            output,
            "  Mean open time per session:     {:.1} min",
            summary.mean_session_duration_minutes
        )
        .unwrap();
        writeln!(output).unwrap();
    }

    if let Some(overall) = &data.overall {
        writeln!(
            output,
            "OVERALL (mean over {} devices)",
            data.summaries.len()
        )
        .unwrap();
        writeln!(
            output,
            "  Mean minutes open per day:      {}",
            fmt_mean(overall.mean_open_minutes_per_day)
        )
        .unwrap();
        writeln!(
            output,
            "  Mean minutes closed per day:    {}",
            fmt_mean(overall.mean_closed_minutes_per_day)
        )
        .unwrap();
        writeln!(
            output,
            "  Mean opening sessions per day:  {:.1}",
            overall.mean_sessions_per_day
        )
        .unwrap();
        writeln!(
            output,
            "  Mean open time per session:     {:.1} min",
            overall.mean_session_duration_minutes
        )
        .unwrap();
        writeln!(output).unwrap();
    }

    if !data.failures.is_empty() {
        writeln!(output, "FAILED").unwrap();
        for failure in &data.failures {
            writeln!(output, "  {}: {}", failure.file.display(), failure.reason).unwrap();
        }
    }

    output
}

/// Runs the report command.
pub fn run<W: std::io::Write>(
    writer: &mut W,
    files: &[PathBuf],
    selection: &WindowSelection,
    json: bool,
    config: &Config,
) -> Result<()> {
    let window = selection.resolve(Local::now().naive_local());
    let data = gather(files, window.as_ref(), config)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &data).context("failed to serialize report")?;
        writeln!(writer)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    if data.summaries.is_empty() && !data.failures.is_empty() {
        bail!("no usable contact stream in the batch");
    }

    Ok(())
}
