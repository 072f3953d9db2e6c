//! # Speed-Based Segmentation
//!
//! Splits the full chronological log wherever the implied travel speed
//! between two consecutive fixes says the subject was moving.
//!
//! ## Algorithm
//! 1. For each consecutive pair, compute the great-circle distance and the
//!    elapsed time
//! 2. Ignore pairs with zero distance or zero elapsed time
//! 3. `speed = distance * upscale / elapsed`; the upscale factor compensates
//!    for straight-line distance underestimating the real path
//! 4. A speed above the threshold closes the current window at the previous
//!    fix and opens a new one at the current fix
//! 5. Windows lasting longer than the minimum dwell are reported
//!
//! Independent of cells and areas.

use chrono::NaiveDateTime;
use log::{debug, info};
#[cfg(feature = "output")]
use serde::{Deserialize, Serialize};

use crate::error::{ResidentialError, Result};
use crate::event_log::CellEvent;
use crate::geo_utils::haversine_km;

/// Configuration for speed-based segmentation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "output", derive(Serialize, Deserialize))]
pub struct SpeedConfig {
    /// Speed above which the subject is moving, in km/s.
    /// Default: 0.0125 (45 km/h)
    pub speed_threshold_km_s: f64,

    /// Multiplier applied to great-circle distance.
    /// Default: 1.1
    pub distance_upscale_factor: f64,

    /// A dwell window must last strictly longer than this to be reported.
    /// Default: 600 seconds
    pub min_dwell_secs: i64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            speed_threshold_km_s: 0.0125,
            distance_upscale_factor: 1.1,
            min_dwell_secs: 600,
        }
    }
}

/// A stationary stretch of the chronological log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellSegment {
    /// Index of the first event
    pub start_index: usize,
    /// Index of the last event (inclusive)
    pub end_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DwellSegment {
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Number of events in the segment.
    pub fn event_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Elapsed seconds between `events[index - 1]` and `events[index]`.
fn elapsed_secs(events: &[CellEvent], index: usize) -> Result<i64> {
    let seconds = (events[index].timestamp - events[index - 1].timestamp).num_seconds();
    if seconds < 0 {
        return Err(ResidentialError::NegativeElapsedTime { index, seconds });
    }
    Ok(seconds)
}

/// Partition a time-sorted log into stationary dwell segments.
///
/// # Errors
///
/// [`ResidentialError::NegativeElapsedTime`] if the log is not sorted by time.
pub fn segment_by_speed(events: &[CellEvent], config: &SpeedConfig) -> Result<Vec<DwellSegment>> {
    let mut segments = Vec::new();
    if events.is_empty() {
        return Ok(segments);
    }

    let mut emit = |low: usize, high: usize| {
        let segment = DwellSegment {
            start_index: low,
            end_index: high,
            start: events[low].timestamp,
            end: events[high].timestamp,
        };
        if segment.duration_secs() > config.min_dwell_secs {
            debug!(
                "[SpeedSegmenter] Dwell {}..={} ({}s)",
                low,
                high,
                segment.duration_secs()
            );
            segments.push(segment);
        }
    };

    let mut low = 0;
    for i in 1..events.len() {
        let secs = elapsed_secs(events, i)?;
        let km = haversine_km(&events[i - 1].point, &events[i].point);
        if km == 0.0 || secs == 0 {
            continue;
        }

        let speed = km * config.distance_upscale_factor / secs as f64;
        if speed > config.speed_threshold_km_s {
            emit(low, i - 1);
            low = i;
        }
    }
    emit(low, events.len() - 1);

    info!(
        "[SpeedSegmenter] {} dwell segments from {} events",
        segments.len(),
        events.len()
    );
    Ok(segments)
}

/// Travel speed at one event, relative to the previous event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub timestamp: NaiveDateTime,
    pub speed_kmh: f64,
}

/// Speed in km/h at every event after the first.
///
/// Pairs with zero elapsed time are skipped. No upscaling is applied.
pub fn speed_profile(events: &[CellEvent]) -> Result<Vec<SpeedSample>> {
    let mut samples = Vec::with_capacity(events.len().saturating_sub(1));
    for i in 1..events.len() {
        let secs = elapsed_secs(events, i)?;
        if secs == 0 {
            continue;
        }
        let km = haversine_km(&events[i - 1].point, &events[i].point);
        samples.push(SpeedSample {
            timestamp: events[i].timestamp,
            speed_kmh: 3600.0 * km / secs as f64,
        });
    }
    Ok(samples)
}
