//! Observations and device event streams.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Open/closed state of a contact sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactState {
    Closed,
    Open,
}

impl ContactState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
        }
    }

    /// Numeric value for step plotting (closed = 0, open = 1).
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
        }
    }
}

impl std::fmt::Display for ContactState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state label that is neither of the recognized sentinels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown contact state label: {0}")]
pub struct UnknownStateLabel(pub String);

impl std::str::FromStr for ContactState {
    type Err = UnknownStateLabel;

    /// Parses the sentinel labels used by the device export (`Open`/`Closed`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "Closed" => Ok(Self::Closed),
            _ => Err(UnknownStateLabel(s.to_string())),
        }
    }
}

/// A timestamped contact reading.
///
/// Timestamps are timezone-naive; the export carries local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub state: ContactState,
}

/// A timestamped continuous reading (temperature, humidity, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// What kind of series a stream carries.
///
/// Decided once by the loader when a file is read, never re-derived from
/// file names or other conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Contact,
    Continuous,
}

/// A binary open/closed series from one device.
///
/// Observations are ordered by timestamp ascending; ties keep arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactStream {
    /// Device name from the export metadata.
    pub accessory_name: String,
    pub observations: Vec<Observation>,
}

impl ContactStream {
    /// First and last timestamps, or `None` for an empty stream.
    #[must_use]
    pub fn extent(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.observations.first()?;
        let last = self.observations.last()?;
        Some((first.timestamp, last.timestamp))
    }
}

/// A continuous measurement series from one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementStream {
    pub accessory_name: String,
    /// Name of the measured quantity, taken from the export header.
    pub measurement: String,
    pub samples: Vec<Measurement>,
}

/// A loaded stream of either kind, tagged at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventStream {
    Contact(ContactStream),
    Continuous(MeasurementStream),
}

impl EventStream {
    #[must_use]
    pub const fn kind(&self) -> StreamKind {
        match self {
            Self::Contact(_) => StreamKind::Contact,
            Self::Continuous(_) => StreamKind::Continuous,
        }
    }

    #[must_use]
    pub fn accessory_name(&self) -> &str {
        match self {
            Self::Contact(s) => &s.accessory_name,
            Self::Continuous(s) => &s.accessory_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_label_parsing() {
        assert_eq!("Open".parse::<ContactState>().unwrap(), ContactState::Open);
        assert_eq!(
            "Closed".parse::<ContactState>().unwrap(),
            ContactState::Closed
        );
        assert!("open".parse::<ContactState>().is_err());
        assert!("Ajar".parse::<ContactState>().is_err());
    }

    #[test]
    fn state_values() {
        assert_eq!(ContactState::Closed.value(), 0);
        assert_eq!(ContactState::Open.value(), 1);
    }

    #[test]
    fn extent_of_empty_stream_is_none() {
        let stream = ContactStream {
            accessory_name: "Front Door".to_string(),
            observations: Vec::new(),
        };
        assert!(stream.extent().is_none());
    }

    #[test]
    fn extent_uses_first_and_last_observation() {
        let t1 = "2024-03-01T09:00:00".parse().unwrap();
        let t2 = "2024-03-02T18:30:00".parse().unwrap();
        let stream = ContactStream {
            accessory_name: "Front Door".to_string(),
            observations: vec![
                Observation {
                    timestamp: t1,
                    state: ContactState::Open,
                },
                Observation {
                    timestamp: t2,
                    state: ContactState::Closed,
                },
            ],
        };
        assert_eq!(stream.extent(), Some((t1, t2)));
    }

    #[test]
    fn event_stream_kind_is_tagged() {
        let stream = EventStream::Contact(ContactStream {
            accessory_name: "Front Door".to_string(),
            observations: Vec::new(),
        });
        assert_eq!(stream.kind(), StreamKind::Contact);
        assert_eq!(stream.accessory_name(), "Front Door");
    }

    #[test]
    fn observation_serde_roundtrip() {
        let obs = Observation {
            timestamp: "2024-03-01T09:00:00".parse().unwrap(),
            state: ContactState::Open,
        };
        let json = serde_json::to_string(&obs).unwrap();
        let parsed: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, obs);
    }
}
