//! # Dwell Intervals
//!
//! Time segmentation and interval-set merging.
//!
//! [`segment_intervals`] turns a time-sorted event sequence into maximal dwell
//! windows; [`merge_intervals`] unions two sorted interval lists. Discovery
//! uses the merge both to grow an area's interval set and to test whether a
//! candidate cell overlaps an area at all (the merged list is shorter than the
//! two inputs combined).

use chrono::NaiveDateTime;
use crate::error::{ResidentialError, Result};

/// Anything carrying a calendar timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for NaiveDateTime {
    #[inline]
    fn timestamp(&self) -> NaiveDateTime {
        *self
    }
}

/// A contiguous dwell period, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    /// Create an interval. `start` must not be after `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start <= end, "interval start after end");
        Self { start, end }
    }

    /// Length of the interval in whole seconds.
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Whether `t` falls inside the interval (both ends inclusive).
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Split a time-sorted sequence into maximal dwell intervals.
///
/// An event stays in the current interval while its timestamp is within
/// `gap_threshold_secs` of the interval's FIRST event. The window is measured
/// from the interval start, not from the previous event, so a steady stream
/// of events is still cut every `gap_threshold_secs`.
///
/// # Errors
///
/// - [`ResidentialError::NegativeThreshold`] if `gap_threshold_secs < 0`
/// - [`ResidentialError::EmptySequence`] for empty input
/// - [`ResidentialError::UnsortedEvents`] if a timestamp goes backwards
///
/// # Example
///
/// ```rust
/// use chrono::{NaiveDate, TimeDelta};
/// use residential_finder::intervals::segment_intervals;
///
/// let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let times: Vec<_> = [0, 40, 80, 500, 520]
///     .iter()
///     .map(|s| base + TimeDelta::seconds(*s))
///     .collect();
///
/// let intervals = segment_intervals(&times, 180).unwrap();
/// assert_eq!(intervals.len(), 2);
/// assert_eq!(intervals[0].end, base + TimeDelta::seconds(80));
/// ```
pub fn segment_intervals<T: Timestamped>(
    events: &[T],
    gap_threshold_secs: i64,
) -> Result<Vec<TimeInterval>> {
    if gap_threshold_secs < 0 {
        return Err(ResidentialError::NegativeThreshold {
            threshold: gap_threshold_secs,
        });
    }
    let first = events.first().ok_or(ResidentialError::EmptySequence)?;

    let mut intervals = Vec::new();
    let mut start = first.timestamp();
    let mut prev = start;

    for (index, event) in events.iter().enumerate().skip(1) {
        let t = event.timestamp();
        if t < prev {
            return Err(ResidentialError::UnsortedEvents { index });
        }
        if (t - start).num_seconds() > gap_threshold_secs {
            intervals.push(TimeInterval::new(start, prev));
            start = t;
        }
        prev = t;
    }
    intervals.push(TimeInterval::new(start, prev));

    Ok(intervals)
}

/// Merge two sorted, internally non-overlapping interval lists.
///
/// Intervals are consumed in order of start time (ties take from `b`). Each
/// one either starts strictly after the last output interval ends and is
/// appended, or is coalesced into it. Touching intervals (`end == start`)
/// coalesce; a one-second gap does not. Once one input is exhausted the
/// remainder of the other goes through the same step, so the output never
/// contains overlapping or touching intervals.
pub fn merge_intervals(a: &[TimeInterval], b: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut merged: Vec<TimeInterval> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        let next = if j >= b.len() || (i < a.len() && a[i].start < b[j].start) {
            i += 1;
            a[i - 1]
        } else {
            j += 1;
            b[j - 1]
        };

        match merged.last_mut() {
            Some(last) if next.start <= last.end => {
                if next.end > last.end {
                    last.end = next.end;
                }
            }
            _ => merged.push(next),
        }
    }

    merged
}

/// Merge `a` and `b` only if they share an instant (touching ends count).
///
/// Returns `None` when every interval of the merge survives on its own.
pub fn merge_if_overlapping(a: &[TimeInterval], b: &[TimeInterval]) -> Option<Vec<TimeInterval>> {
    let merged = merge_intervals(a, b);
    (merged.len() < a.len() + b.len()).then_some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn ts(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn iv(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(ts(start), ts(end))
    }

    fn times(secs: &[i64]) -> Vec<NaiveDateTime> {
        secs.iter().map(|s| ts(*s)).collect()
    }

    #[test]
    fn test_segment_single_window() {
        let intervals = segment_intervals(&times(&[0, 40, 80, 120, 160]), 180).unwrap();
        assert_eq!(intervals, vec![iv(0, 160)]);
    }

    #[test]
    fn test_segment_window_measured_from_start() {
        // Consecutive gaps are all 100s but the window from 0 closes after 200
        let intervals = segment_intervals(&times(&[0, 100, 200, 300, 400]), 250).unwrap();
        assert_eq!(intervals, vec![iv(0, 200), iv(300, 400)]);
    }

    #[test]
    fn test_segment_boundary_inclusive() {
        let intervals = segment_intervals(&times(&[0, 180, 181]), 180).unwrap();
        assert_eq!(intervals, vec![iv(0, 180), iv(181, 181)]);
    }

    #[test]
    fn test_segment_single_event() {
        let intervals = segment_intervals(&times(&[42]), 180).unwrap();
        assert_eq!(intervals, vec![iv(42, 42)]);
        assert_eq!(intervals[0].duration_secs(), 0);
    }

    #[test]
    fn test_segment_zero_threshold() {
        let intervals = segment_intervals(&times(&[0, 0, 1, 5]), 0).unwrap();
        assert_eq!(intervals, vec![iv(0, 0), iv(1, 1), iv(5, 5)]);
    }

    #[test]
    fn test_segment_errors() {
        let empty: Vec<NaiveDateTime> = vec![];
        assert!(matches!(
            segment_intervals(&empty, 180),
            Err(ResidentialError::EmptySequence)
        ));
        assert!(matches!(
            segment_intervals(&times(&[0]), -1),
            Err(ResidentialError::NegativeThreshold { threshold: -1 })
        ));
        assert!(matches!(
            segment_intervals(&times(&[0, 50, 10]), 180),
            Err(ResidentialError::UnsortedEvents { index: 2 })
        ));
    }

    #[test]
    fn test_merge_touching_coalesces() {
        let merged = merge_intervals(&[iv(10, 20)], &[iv(20, 30)]);
        assert_eq!(merged, vec![iv(10, 30)]);
    }

    #[test]
    fn test_merge_one_second_gap_stays_apart() {
        let merged = merge_intervals(&[iv(10, 19)], &[iv(20, 30)]);
        assert_eq!(merged, vec![iv(10, 19), iv(20, 30)]);
    }

    #[test]
    fn test_merge_with_empty() {
        let x = vec![iv(0, 5), iv(10, 15)];
        assert_eq!(merge_intervals(&x, &[]), x);
        assert_eq!(merge_intervals(&[], &x), x);
        assert!(merge_intervals(&[], &[]).is_empty());
    }

    #[test]
    fn test_merge_contained_interval_keeps_end() {
        let merged = merge_intervals(&[iv(0, 100)], &[iv(10, 20)]);
        assert_eq!(merged, vec![iv(0, 100)]);
    }

    #[test]
    fn test_merge_tail_overlapping_last_output() {
        let merged = merge_intervals(&[iv(0, 100)], &[iv(10, 20), iv(30, 40), iv(150, 160)]);
        assert_eq!(merged, vec![iv(0, 100), iv(150, 160)]);
    }

    #[test]
    fn test_merge_if_overlapping() {
        assert_eq!(
            merge_if_overlapping(&[iv(0, 10)], &[iv(10, 20)]),
            Some(vec![iv(0, 20)])
        );
        assert!(merge_if_overlapping(&[iv(0, 9)], &[iv(10, 20)]).is_none());
        assert!(merge_if_overlapping(&[], &[iv(10, 20)]).is_none());
    }
}
