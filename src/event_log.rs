//! Connection log and its per-cell partitioning.
//!
//! The [`EventLog`] owns the full chronological list of [`CellEvent`]s and one
//! [`CellGroup`] per distinct cell tag. Both are sorted by time when the log is
//! built, so everything downstream can rely on chronological order.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::debug;

use crate::error::{ResidentialError, Result};
use crate::intervals::{segment_intervals, TimeInterval, Timestamped};
use crate::ranking::ActivityRanker;
use crate::{AreaId, GpsPoint};

/// Residential area an event has been attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaAssignment {
    #[default]
    Unassigned,
    Assigned(AreaId),
}

impl AreaAssignment {
    /// Numeric id for flat output formats (0 when unassigned).
    pub fn id(&self) -> u32 {
        match self {
            AreaAssignment::Unassigned => 0,
            AreaAssignment::Assigned(id) => *id,
        }
    }
}

/// A single logged connection to a cell tower.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEvent {
    pub timestamp: NaiveDateTime,
    pub point: GpsPoint,
    pub cell_tag: String,
    area: AreaAssignment,
}

impl CellEvent {
    pub fn new(timestamp: NaiveDateTime, point: GpsPoint, cell_tag: impl Into<String>) -> Self {
        Self {
            timestamp,
            point,
            cell_tag: cell_tag.into(),
            area: AreaAssignment::Unassigned,
        }
    }

    pub fn area(&self) -> AreaAssignment {
        self.area
    }

    /// Attribute this event to an area. Allowed once per event.
    pub fn assign_area(&mut self, id: AreaId) -> Result<()> {
        if let AreaAssignment::Assigned(existing) = self.area {
            return Err(ResidentialError::AreaAlreadyAssigned {
                cell_tag: self.cell_tag.clone(),
                existing,
            });
        }
        self.area = AreaAssignment::Assigned(id);
        Ok(())
    }
}

impl Timestamped for CellEvent {
    #[inline]
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// All events logged against one cell tag, sorted by time.
#[derive(Debug, Clone)]
pub struct CellGroup {
    pub tag: String,
    pub events: Vec<CellEvent>,
}

impl CellGroup {
    /// Number of logged connections.
    pub fn num_connections(&self) -> usize {
        self.events.len()
    }

    /// Dwell intervals of this cell for the given gap threshold.
    pub fn time_segments(&self, gap_threshold_secs: i64) -> Result<Vec<TimeInterval>> {
        segment_intervals(&self.events, gap_threshold_secs)
    }
}

/// Chronological connection log partitioned by cell.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CellEvent>,
    groups: Vec<CellGroup>,
    group_index: HashMap<String, usize>,
}

impl EventLog {
    /// Build the log from events in arrival order.
    ///
    /// Groups are created in order of each tag's first appearance. The log and
    /// every group are then stably sorted by timestamp.
    pub fn from_events(events: Vec<CellEvent>) -> Self {
        let mut groups: Vec<CellGroup> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for event in &events {
            match group_index.get(&event.cell_tag) {
                Some(&idx) => groups[idx].events.push(event.clone()),
                None => {
                    group_index.insert(event.cell_tag.clone(), groups.len());
                    groups.push(CellGroup {
                        tag: event.cell_tag.clone(),
                        events: vec![event.clone()],
                    });
                }
            }
        }

        for group in &mut groups {
            group.events.sort_by_key(|e| e.timestamp);
        }

        let mut events = events;
        events.sort_by_key(|e| e.timestamp);

        debug!(
            "[EventLog] {} events across {} cells",
            events.len(),
            groups.len()
        );

        Self { events, groups, group_index }
    }

    /// Events in chronological order.
    pub fn events(&self) -> &[CellEvent] {
        &self.events
    }

    /// Cell groups in order of first appearance.
    pub fn groups(&self) -> &[CellGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up a cell group by tag.
    pub fn group(&self, tag: &str) -> Result<&CellGroup> {
        self.group_index
            .get(tag)
            .map(|&idx| &self.groups[idx])
            .ok_or_else(|| ResidentialError::UnknownCell(tag.to_string()))
    }

    /// Number of connections logged against `tag`.
    pub fn num_connections(&self, tag: &str) -> Result<usize> {
        Ok(self.group(tag)?.num_connections())
    }

    /// Dwell intervals of `tag` for the given gap threshold.
    pub fn time_segments(&self, tag: &str, gap_threshold_secs: i64) -> Result<Vec<TimeInterval>> {
        self.group(tag)?.time_segments(gap_threshold_secs)
    }

    /// Activity ranking over the current cell groups.
    pub fn ranker(&self) -> ActivityRanker {
        ActivityRanker::from_groups(&self.groups)
    }

    /// Write discovered area ids onto every event of an assigned cell.
    ///
    /// Returns the number of events that received an area. Nothing is written
    /// unless every matching event is still unassigned.
    pub fn apply_assignments(&mut self, assignments: &HashMap<String, AreaId>) -> Result<usize> {
        let conflict = self
            .events
            .iter()
            .filter(|e| assignments.contains_key(&e.cell_tag))
            .find_map(|e| match e.area {
                AreaAssignment::Assigned(existing) => Some((e, existing)),
                AreaAssignment::Unassigned => None,
            });
        if let Some((event, existing)) = conflict {
            return Err(ResidentialError::AreaAlreadyAssigned {
                cell_tag: event.cell_tag.clone(),
                existing,
            });
        }

        let mut assigned = 0;
        for event in &mut self.events {
            if let Some(&id) = assignments.get(&event.cell_tag) {
                event.assign_area(id)?;
                assigned += 1;
            }
        }
        debug!("[EventLog] Assigned {} of {} events to areas", assigned, self.events.len());
        Ok(assigned)
    }

    /// Events attributed to `area`, in chronological order.
    pub fn area_events(&self, area: AreaId) -> impl Iterator<Item = &CellEvent> {
        self.events
            .iter()
            .filter(move |e| e.area == AreaAssignment::Assigned(area))
    }

    /// Positions of all events attributed to `area`.
    pub fn area_points(&self, area: AreaId) -> Vec<GpsPoint> {
        self.area_events(area).map(|e| e.point).collect()
    }
}
