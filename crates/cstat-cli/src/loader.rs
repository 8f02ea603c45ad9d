//! Device export loading.
//!
//! Reads the CSV export of the companion app: three metadata lines, a header
//! row, then timestamped rows sorted here into ascending order. The stream
//! kind is decided once from the header row at load time and tagged onto the
//! returned [`EventStream`]; it is never re-derived from the file name.
//!
//! ```text
//! Accessory Name: Front Door
//! Serial Number: AB12CD3456
//! Export Date: 2024-03-08T10:00:00
//! Date,Contact
//! 2024-03-01T09:00:00,Open
//! 2024-03-01T09:30:00,Closed
//! ```
//!
//! Continuous exports carry the measurement name in the second header
//! column (e.g. `Date,Temperature`) and numeric values in the rows.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

use cstat_core::{
    ContactStream, EventStream, Measurement, MeasurementStream, Observation,
};

/// Number of metadata lines preceding the header row.
const METADATA_LINES: usize = 3;

/// Metadata prefix carrying the device name.
const ACCESSORY_PREFIX: &str = "Accessory Name:";

/// Device name used when the metadata line is absent or unreadable.
const UNKNOWN_ACCESSORY: &str = "Unknown";

/// Timestamp layout used by the export.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Header column marking a binary contact stream.
const CONTACT_COLUMN: &str = "Contact";

/// Errors reading one export file. Any of these is fatal for that stream;
/// sibling streams in a batch are unaffected.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing header row")]
    MissingHeader,
    #[error("line {line}: expected two comma-separated fields")]
    MalformedRow { line: usize },
    #[error("line {line}: malformed timestamp: {value}")]
    MalformedTimestamp { line: usize, value: String },
    #[error("line {line}: unknown contact state label: {label}")]
    UnknownStateLabel { line: usize, label: String },
    #[error("line {line}: malformed measurement value: {value}")]
    MalformedValue { line: usize, value: String },
}

/// Loads one export file, tagging it as contact or continuous.
pub fn load_stream(path: &Path) -> Result<EventStream, LoadError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut accessory_name = UNKNOWN_ACCESSORY.to_string();
    let mut header: Option<String> = None;
    // (1-based line number, raw row) pairs for error reporting.
    let mut rows: Vec<(usize, String)> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index < METADATA_LINES {
            if let Some(name) = line.strip_prefix(ACCESSORY_PREFIX) {
                accessory_name = name.trim().to_string();
            }
        } else if header.is_none() {
            header = Some(line);
        } else if !line.trim().is_empty() {
            rows.push((index + 1, line));
        }
    }

    let header = header.ok_or(LoadError::MissingHeader)?;
    let value_column = header
        .split_once(',')
        .map(|(_, rest)| rest.trim())
        .ok_or(LoadError::MissingHeader)?;

    if value_column == CONTACT_COLUMN {
        let mut observations = parse_contact_rows(&rows)?;
        observations.sort_by_key(|o| o.timestamp);
        Ok(EventStream::Contact(ContactStream {
            accessory_name,
            observations,
        }))
    } else {
        let mut samples = parse_measurement_rows(&rows)?;
        samples.sort_by_key(|m| m.timestamp);
        Ok(EventStream::Continuous(MeasurementStream {
            accessory_name,
            measurement: value_column.to_string(),
            samples,
        }))
    }
}

fn split_row(line: usize, row: &str) -> Result<(NaiveDateTime, &str), LoadError> {
    let (date, value) = row
        .split_once(',')
        .ok_or(LoadError::MalformedRow { line })?;
    let timestamp = NaiveDateTime::parse_from_str(date.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        LoadError::MalformedTimestamp {
            line,
            value: date.trim().to_string(),
        }
    })?;
    Ok((timestamp, value.trim()))
}

fn parse_contact_rows(rows: &[(usize, String)]) -> Result<Vec<Observation>, LoadError> {
    rows.iter()
        .map(|(line, row)| {
            let (timestamp, label) = split_row(*line, row)?;
            let state = label
                .parse()
                .map_err(|_| LoadError::UnknownStateLabel {
                    line: *line,
                    label: label.to_string(),
                })?;
            Ok(Observation { timestamp, state })
        })
        .collect()
}

fn parse_measurement_rows(rows: &[(usize, String)]) -> Result<Vec<Measurement>, LoadError> {
    rows.iter()
        .map(|(line, row)| {
            let (timestamp, value) = split_row(*line, row)?;
            let value = value.parse().map_err(|_| LoadError::MalformedValue {
                line: *line,
                value: value.to_string(),
            })?;
            Ok(Measurement { timestamp, value })
        })
        .collect()
}
