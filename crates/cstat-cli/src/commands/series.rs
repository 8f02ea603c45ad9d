//! Series command: window-aligned observation series for external plotting.
//!
//! Contact streams come out as step-function points padded to the window
//! edges; continuous streams pass through the filter untouched so both can
//! share one time axis.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use cstat_core::{
    EventStream, StreamKind, TimeWindow, WindowSelection, align_to_window, filter_measurements,
    filter_observations,
};
use serde::Serialize;

use crate::Config;
use crate::loader;

/// One plottable point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// One device's series inside the requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSeries {
    pub accessory_name: String,
    pub kind: StreamKind,
    /// Measurement name for continuous streams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    pub points: Vec<SeriesPoint>,
}

/// Combined payload for the `--combined` view.
#[derive(Debug, Serialize)]
pub struct CombinedSeries<'a> {
    pub series: &'a [DeviceSeries],
}

/// Loads one file and projects it into the window.
pub fn build_series(
    path: &Path,
    window: Option<&TimeWindow>,
) -> Result<DeviceSeries> {
    let stream = loader::load_stream(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    Ok(match stream {
        EventStream::Contact(contact) => {
            let filtered = filter_observations(&contact.observations, window);
            let aligned = align_to_window(&filtered, window);
            DeviceSeries {
                accessory_name: contact.accessory_name,
                kind: StreamKind::Contact,
                measurement: None,
                points: aligned
                    .iter()
                    .map(|o| SeriesPoint {
                        timestamp: o.timestamp,
                        value: f64::from(o.state.value()),
                    })
                    .collect(),
            }
        }
        EventStream::Continuous(continuous) => {
            let filtered = filter_measurements(&continuous.samples, window);
            DeviceSeries {
                accessory_name: continuous.accessory_name,
                kind: StreamKind::Continuous,
                measurement: Some(continuous.measurement),
                points: filtered
                    .iter()
                    .map(|m| SeriesPoint {
                        timestamp: m.timestamp,
                        value: m.value,
                    })
                    .collect(),
            }
        }
    })
}

/// Runs the series command.
///
/// With `--combined` every device lands in one JSON document; otherwise one
/// document per device is written per line, in input order.
pub fn run<W: std::io::Write>(
    writer: &mut W,
    files: &[PathBuf],
    selection: &WindowSelection,
    combined: bool,
    config: &Config,
) -> Result<()> {
    if files.len() > config.max_files {
        bail!(
            "got {} files, the maximum per run is {}",
            files.len(),
            config.max_files
        );
    }

    let window = selection.resolve(Local::now().naive_local());

    let mut series = Vec::with_capacity(files.len());
    for path in files {
        match build_series(path, window.as_ref()) {
            Ok(device) => series.push(device),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unusable stream");
                eprintln!("warning: {e:#}");
            }
        }
    }

    if series.is_empty() {
        bail!("no usable stream in the batch");
    }

    if combined {
        serde_json::to_writer_pretty(&mut *writer, &CombinedSeries { series: &series })
            .context("failed to serialize series")?;
        writeln!(writer)?;
    } else {
        for device in &series {
            serde_json::to_writer(&mut *writer, device).context("failed to serialize series")?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
