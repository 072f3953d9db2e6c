//! # Residential Finder
//!
//! Residential area inference from cell-tower connection logs.
//!
//! This library provides:
//! - Dwell-interval segmentation of per-cell connection times
//! - Interval-set merging to attribute cells to shared residential areas
//! - Activity ranking of cells with early termination
//! - Speed-based segmentation of the full chronological log
//! - Centroid and spread analysis of discovered areas
//!
//! ## Features
//!
//! - **`output`** (default) - GeoJSON/CSV writers and serde support for configs
//! - **`parallel`** - Segment candidate cells in parallel with rayon
//! - **`cli`** - The `residential-cli` batch driver
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use residential_finder::{discover_residential_areas, ingest, DiscoveryConfig};
//!
//! let data = "time,lon,lat,cell\n\
//!             2019-03-01 08:00:05,121.5125,25.0456,CELL_133\n\
//!             2019-03-01 08:01:10,121.5126,25.0457,CELL_133\n";
//!
//! let mut log = ingest::parse_event_log(data.as_bytes()).unwrap();
//! let result = discover_residential_areas(&log, log.ranker(), &DiscoveryConfig::default()).unwrap();
//! log.apply_assignments(&result.assignments).unwrap();
//!
//! // Two connections are far too few for a residential area
//! assert_eq!(result.area_count(), 0);
//! ```

// Unified error handling
pub mod error;
pub use error::{ResidentialError, Result};

// Distance and centroid computations
pub mod geo_utils;

// Connection log and per-cell groups
pub mod event_log;
pub use event_log::{AreaAssignment, CellEvent, CellGroup, EventLog};

// Dwell interval segmentation and merging
pub mod intervals;
pub use intervals::{merge_intervals, segment_intervals, TimeInterval, Timestamped};

// Cell activity ranking
pub mod ranking;
pub use ranking::{ActivityRanker, RankedCell};

// Residential area discovery
pub mod discovery;
pub use discovery::{discover_residential_areas, DiscoveryConfig, DiscoveryResult, ResidentialArea};

// Speed-based segmentation
pub mod speed;
pub use speed::{segment_by_speed, speed_profile, DwellSegment, SpeedConfig, SpeedSample};

// Log ingestion
pub mod ingest;
pub use ingest::{parse_event_log, read_event_log};

// Flat-file writers
#[cfg(feature = "output")]
pub mod output;

// ============================================================================
// Core Types
// ============================================================================

/// Identifier of a discovered residential area. Positive, assigned from 1.
pub type AreaId = u32;

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use residential_finder::GpsPoint;
/// let point = GpsPoint::new(25.0456, 121.5125); // Taipei
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}
