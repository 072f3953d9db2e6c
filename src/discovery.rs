//! # Residential Area Discovery
//!
//! Assigns the most active cells to residential areas.
//!
//! ## Algorithm
//! 1. Walk cells from most to least active
//! 2. Stop as soon as a cell has too few connections to ever reach the
//!    minimum stay time (every less active cell has even fewer)
//! 3. Segment the cell's connections into dwell intervals
//! 4. Skip the cell if `intervals * gap_threshold` does not exceed the
//!    minimum stay time
//! 5. Merge the cell into the FIRST existing area whose intervals overlap
//!    its own, otherwise open a new area
//!
//! Area ids are handed out in ranked order, so matching is always sequential
//! even when segmentation runs in parallel.

use std::collections::HashMap;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "output")]
use serde::{Deserialize, Serialize};

use crate::error::{ResidentialError, Result};
use crate::event_log::EventLog;
use crate::intervals::{merge_if_overlapping, TimeInterval};
use crate::ranking::{ActivityRanker, RankedCell};
use crate::AreaId;

/// Configuration for residential area discovery.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "output", derive(Serialize, Deserialize))]
pub struct DiscoveryConfig {
    /// Maximum window (seconds from the window's first connection) that still
    /// counts as one continuous stay. Must be positive.
    /// Default: 180
    pub gap_threshold_secs: i64,

    /// Estimated stay time a cell must exceed to count as residential.
    /// Default: 3600 (one hour)
    pub min_stay_secs: i64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: 180,
            min_stay_secs: 3600,
        }
    }
}

impl DiscoveryConfig {
    /// Fewest connections a cell needs before its stay time can pass
    /// `min_stay_secs`.
    ///
    /// # Errors
    ///
    /// [`ResidentialError::InvalidThreshold`] if the configuration is invalid.
    pub fn min_connections(&self) -> Result<usize> {
        self.validate()?;
        Ok((self.min_stay_secs / self.gap_threshold_secs) as usize)
    }

    fn validate(&self) -> Result<()> {
        if self.gap_threshold_secs <= 0 {
            return Err(ResidentialError::InvalidThreshold {
                name: "gap_threshold_secs",
                value: self.gap_threshold_secs.to_string(),
            });
        }
        if self.min_stay_secs < 0 {
            return Err(ResidentialError::InvalidThreshold {
                name: "min_stay_secs",
                value: self.min_stay_secs.to_string(),
            });
        }
        Ok(())
    }
}

/// A discovered residential area.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentialArea {
    /// Sequential id, starting at 1
    pub id: AreaId,
    /// Union of the dwell intervals of every contributing cell
    pub intervals: Vec<TimeInterval>,
    /// Contributing cells, in the order they joined
    pub cell_tags: Vec<String>,
}

impl ResidentialArea {
    /// Sum of interval lengths in seconds.
    pub fn total_dwell_secs(&self) -> i64 {
        self.intervals.iter().map(|i| i.duration_secs()).sum()
    }
}

/// Outcome of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    /// Cell tag to area id. Cells that did not qualify are absent.
    pub assignments: HashMap<String, AreaId>,
    /// Areas in discovery order (`areas[i].id == i + 1`)
    pub areas: Vec<ResidentialArea>,
    /// Number of cells that passed the activity bound and were segmented
    pub cells_examined: usize,
}

impl DiscoveryResult {
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn area_of(&self, tag: &str) -> Option<AreaId> {
        self.assignments.get(tag).copied()
    }
}

/// Discover residential areas from the log's cells in ranked order.
///
/// # Errors
///
/// Returns [`ResidentialError::InvalidThreshold`] for a non-positive gap
/// threshold or a negative minimum stay, [`ResidentialError::UnknownCell`] if
/// the ranking names a cell the log does not have, and any segmentation error.
///
/// # Example
///
/// ```rust
/// use chrono::{NaiveDate, TimeDelta};
/// use residential_finder::{CellEvent, EventLog, GpsPoint, DiscoveryConfig, discover_residential_areas};
///
/// let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// // One connection every 200s for two hours: each connection is its own interval
/// let events: Vec<CellEvent> = (0..36)
///     .map(|i| CellEvent::new(base + TimeDelta::seconds(i * 200), GpsPoint::new(25.04, 121.51), "HOME"))
///     .collect();
/// let log = EventLog::from_events(events);
///
/// let result = discover_residential_areas(&log, log.ranker(), &DiscoveryConfig::default()).unwrap();
/// assert_eq!(result.area_of("HOME"), Some(1));
/// ```
pub fn discover_residential_areas(
    log: &EventLog,
    ranker: ActivityRanker,
    config: &DiscoveryConfig,
) -> Result<DiscoveryResult> {
    let min_connections = config.min_connections()?;
    let candidates: Vec<RankedCell> = ranker
        .take_while(|cell| cell.count >= min_connections)
        .collect();

    info!(
        "[Discovery] {} candidate cells with >= {} connections (gap {}s)",
        candidates.len(),
        min_connections,
        config.gap_threshold_secs
    );

    let segments = segment_candidates(log, &candidates, config.gap_threshold_secs)?;

    let mut result = DiscoveryResult {
        cells_examined: candidates.len(),
        ..Default::default()
    };
    for (cell, intervals) in candidates.iter().zip(segments) {
        assign_cell(&mut result, cell, intervals, config);
    }

    info!(
        "[Discovery] Found {} areas covering {} cells",
        result.areas.len(),
        result.assignments.len()
    );
    Ok(result)
}

#[cfg(not(feature = "parallel"))]
fn segment_candidates(
    log: &EventLog,
    candidates: &[RankedCell],
    gap_threshold_secs: i64,
) -> Result<Vec<Vec<TimeInterval>>> {
    candidates
        .iter()
        .map(|cell| log.time_segments(&cell.tag, gap_threshold_secs))
        .collect()
}

#[cfg(feature = "parallel")]
fn segment_candidates(
    log: &EventLog,
    candidates: &[RankedCell],
    gap_threshold_secs: i64,
) -> Result<Vec<Vec<TimeInterval>>> {
    candidates
        .par_iter()
        .map(|cell| log.time_segments(&cell.tag, gap_threshold_secs))
        .collect()
}

/// Attach one segmented cell to an existing area, a new area, or nothing.
fn assign_cell(
    result: &mut DiscoveryResult,
    cell: &RankedCell,
    intervals: Vec<TimeInterval>,
    config: &DiscoveryConfig,
) {
    let stay_secs = intervals.len() as i64 * config.gap_threshold_secs;
    if stay_secs <= config.min_stay_secs {
        debug!(
            "[Discovery] Skipping {} ({} connections): stay {}s <= {}s",
            cell.tag, cell.count, stay_secs, config.min_stay_secs
        );
        return;
    }

    for area in &mut result.areas {
        if let Some(merged) = merge_if_overlapping(&intervals, &area.intervals) {
            debug!(
                "[Discovery] {} joins area {} (stay {}s, {} -> {} intervals)",
                cell.tag,
                area.id,
                stay_secs,
                area.intervals.len(),
                merged.len()
            );
            area.intervals = merged;
            area.cell_tags.push(cell.tag.clone());
            result.assignments.insert(cell.tag.clone(), area.id);
            return;
        }
    }

    let id = result.areas.len() as AreaId + 1;
    debug!(
        "[Discovery] {} opens area {} (stay {}s, {} intervals)",
        cell.tag,
        id,
        stay_secs,
        intervals.len()
    );
    result.areas.push(ResidentialArea {
        id,
        intervals,
        cell_tags: vec![cell.tag.clone()],
    });
    result.assignments.insert(cell.tag.clone(), id);
}
