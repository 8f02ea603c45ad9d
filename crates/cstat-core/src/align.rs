//! Window-edge alignment for joint step plotting.
//!
//! A contact series drawn next to a continuous series inside a bounded
//! window needs explicit points at the window edges, or the step function
//! appears to start and stop mid-window.

use crate::observation::Observation;
use crate::window::{TimeWindow, end_of_day, start_of_day};

/// Pads a filtered contact series with synthetic boundary observations.
///
/// The boundary at the window-start date (00:00:00) and the one at the
/// window-end date (23:59:59.999999) both carry the state of the stream's
/// *last* observation, projecting the final known state backward to the
/// window start as well as forward to the window end. With no window, or
/// an empty stream, the input comes back unchanged.
#[must_use]
pub fn align_to_window(
    observations: &[Observation],
    window: Option<&TimeWindow>,
) -> Vec<Observation> {
    let (Some(window), Some(last)) = (window, observations.last()) else {
        return observations.to_vec();
    };

    let mut aligned = Vec::with_capacity(observations.len() + 2);
    aligned.push(Observation {
        timestamp: start_of_day(window.start.date()),
        state: last.state,
    });
    aligned.extend_from_slice(observations);
    aligned.push(Observation {
        timestamp: end_of_day(window.end.date()),
        state: last.state,
    });
    aligned
}
