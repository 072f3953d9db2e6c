//! Flat-file outputs.
//!
//! One-way sinks for a labelled [`EventLog`]. File names follow a fixed scheme
//! inside the caller's output directory:
//!
//! | Writer | File(s) |
//! |--------|---------|
//! | [`write_area_timeline`] | `time-vs-area.csv` |
//! | [`write_area_geojson`] | `area-{id}.json` |
//! | [`write_speed_segments_geojson`] | `map-by-speed-{n}-{HHMMSS}-to-{HHMMSS}.json` |
//! | [`write_midpoint_analysis`] | `{gravity,average}-area-{id}.csv` |
//! | [`write_geo_files`] | `area-{id}-lon.txt`, `area-{id}-lat.txt` |
//! | [`write_speed_profile`] | `time-vs-speed.csv` |

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event_log::{CellEvent, EventLog};
use crate::geo_utils::{center_of_gravity, compute_center, deviation_cdf, deviation_stats, DeviationStats};
use crate::speed::{DwellSegment, SpeedSample};
use crate::{AreaId, GpsPoint};

const CLOCK_FORMAT: &str = "%H:%M:%S";
const COMPACT_CLOCK_FORMAT: &str = "%H%M%S";

/// GeoJSON `MultiPoint` geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]` pairs
    pub coordinates: Vec<[f64; 2]>,
}

impl MultiPoint {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GpsPoint>) -> Self {
        Self {
            kind: "MultiPoint".to_string(),
            coordinates: points.into_iter().map(|p| [p.longitude, p.latitude]).collect(),
        }
    }
}

/// Centroid method used by the midpoint analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidpointMethod {
    /// Spherical center of gravity
    Gravity,
    /// Arithmetic mean of latitude and longitude
    Average,
}

impl MidpointMethod {
    pub fn name(&self) -> &'static str {
        match self {
            MidpointMethod::Gravity => "gravity",
            MidpointMethod::Average => "average",
        }
    }

    pub fn center(&self, points: &[GpsPoint]) -> GpsPoint {
        match self {
            MidpointMethod::Gravity => center_of_gravity(points),
            MidpointMethod::Average => compute_center(points),
        }
    }
}

/// Configuration for the midpoint analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidpointConfig {
    /// Number of radius steps in each CDF file.
    /// Default: 50
    pub cdf_samples: u32,
}

impl Default for MidpointConfig {
    fn default() -> Self {
        Self { cdf_samples: 50 }
    }
}

/// Centroid and spread of one area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaSummary {
    pub area: AreaId,
    pub center: GpsPoint,
    pub deviation: DeviationStats,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write `time,areaID` for every event of the log.
pub fn write_area_timeline(dir: &Path, log: &EventLog) -> Result<PathBuf> {
    let path = dir.join("time-vs-area.csv");
    let mut out = create(&path)?;
    writeln!(out, "time,areaID")?;
    for event in log.events() {
        writeln!(
            out,
            "{},{}",
            event.timestamp.format(CLOCK_FORMAT),
            event.area().id()
        )?;
    }
    out.flush()?;
    Ok(path)
}

/// Write `points` as a pretty-printed GeoJSON `MultiPoint`.
pub fn write_multipoint_geojson<'a>(
    path: &Path,
    points: impl IntoIterator<Item = &'a GpsPoint>,
) -> Result<()> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, &MultiPoint::from_points(points))?;
    out.flush()?;
    Ok(())
}

/// One `MultiPoint` file per area with the positions of its events.
pub fn write_area_geojson(dir: &Path, log: &EventLog, area_count: usize) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(area_count);
    for area in 1..=area_count as AreaId {
        let path = dir.join(format!("area-{area}.json"));
        write_multipoint_geojson(&path, log.area_events(area).map(|e| &e.point))?;
        paths.push(path);
    }
    Ok(paths)
}

/// One `MultiPoint` file per speed-based dwell segment, numbered from 1.
pub fn write_speed_segments_geojson(
    dir: &Path,
    events: &[CellEvent],
    segments: &[DwellSegment],
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(segments.len());
    for (n, segment) in segments.iter().enumerate() {
        let path = dir.join(format!(
            "map-by-speed-{}-{}-to-{}.json",
            n + 1,
            segment.start.format(COMPACT_CLOCK_FORMAT),
            segment.end.format(COMPACT_CLOCK_FORMAT)
        ));
        let slice = &events[segment.start_index..=segment.end_index];
        write_multipoint_geojson(&path, slice.iter().map(|e| &e.point))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Centroid, spread and CDF of every area for one centroid method.
///
/// Writes `{method}-area-{id}.csv` with `bound_km,percentage` rows and returns
/// the per-area summaries. Areas without events are skipped.
pub fn write_midpoint_analysis(
    dir: &Path,
    log: &EventLog,
    area_count: usize,
    method: MidpointMethod,
    config: &MidpointConfig,
) -> Result<Vec<AreaSummary>> {
    let mut summaries = Vec::with_capacity(area_count);

    for area in 1..=area_count as AreaId {
        let points = log.area_points(area);
        let center = method.center(&points);
        let Some(deviation) = deviation_stats(&points, &center) else {
            warn!("[Midpoint] Area {} has no events, skipping", area);
            continue;
        };

        info!(
            "[Midpoint] {} area {}: center ({:.10}, {:.10}), mean {:.4} km, max {:.4} km, min {:.4} km",
            method.name(),
            area,
            center.latitude,
            center.longitude,
            deviation.mean_km,
            deviation.max_km,
            deviation.min_km
        );

        let path = dir.join(format!("{}-area-{}.csv", method.name(), area));
        let mut out = create(&path)?;
        for (bound, percentage) in deviation_cdf(&points, &center, deviation.max_km, config.cdf_samples) {
            writeln!(out, "{},{}", bound, percentage)?;
        }
        out.flush()?;

        summaries.push(AreaSummary {
            area,
            center,
            deviation,
        });
    }

    Ok(summaries)
}

/// Raw longitude and latitude dumps per area, one value per line.
pub fn write_geo_files(dir: &Path, log: &EventLog, area_count: usize) -> Result<()> {
    for area in 1..=area_count as AreaId {
        let mut lon = create(&dir.join(format!("area-{area}-lon.txt")))?;
        let mut lat = create(&dir.join(format!("area-{area}-lat.txt")))?;
        for event in log.area_events(area) {
            writeln!(lon, "{}", event.point.longitude)?;
            writeln!(lat, "{}", event.point.latitude)?;
        }
        lon.flush()?;
        lat.flush()?;
    }
    Ok(())
}

/// Write `time,speed` (km/h) rows.
pub fn write_speed_profile(dir: &Path, samples: &[SpeedSample]) -> Result<PathBuf> {
    let path = dir.join("time-vs-speed.csv");
    let mut out = create(&path)?;
    writeln!(out, "time,speed")?;
    for sample in samples {
        writeln!(out, "{},{}", sample.timestamp.format(CLOCK_FORMAT), sample.speed_kmh)?;
    }
    out.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipoint_serialization() {
        let points = [GpsPoint::new(25.0, 121.5), GpsPoint::new(25.1, 121.6)];
        let json = serde_json::to_value(MultiPoint::from_points(&points)).unwrap();
        assert_eq!(json["type"], "MultiPoint");
        assert_eq!(json["coordinates"][0][0], 121.5);
        assert_eq!(json["coordinates"][1][1], 25.1);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(MidpointMethod::Gravity.name(), "gravity");
        assert_eq!(MidpointMethod::Average.name(), "average");
    }
}
