//! # Geographic Utilities
//!
//! Distance and centroid computations used by speed segmentation and the
//! per-area midpoint analysis.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_km`] | Great-circle distance between two GPS points in kilometres |
//! | [`compute_center`] | Arithmetic mean of latitudes and longitudes |
//! | [`center_of_gravity`] | Spherical center of gravity (mean of unit vectors) |
//! | [`deviation_stats`] | Mean/max/min distance of points to a center |
//! | [`deviation_cdf`] | Cumulative share of points within growing radii |
//!
//! ## Example
//!
//! ```rust
//! use residential_finder::{GpsPoint, geo_utils};
//!
//! let points = vec![
//!     GpsPoint::new(25.0456, 121.5125),
//!     GpsPoint::new(25.0460, 121.5130),
//!     GpsPoint::new(25.0450, 121.5120),
//! ];
//!
//! let center = geo_utils::compute_center(&points);
//! let stats = geo_utils::deviation_stats(&points, &center).unwrap();
//! assert!(stats.max_km < 0.1);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances come from [`geo::Haversine`], which assumes a spherical Earth with
//! mean radius 6,371 km. Consecutive cell-tower fixes are rarely more than a
//! few tens of kilometres apart, so the spherical error is negligible next to
//! tower placement error.
//!
//! ### Center of Gravity
//!
//! Each point is converted to a 3D unit vector, the vectors are averaged, and
//! the mean vector is projected back to latitude/longitude. Unlike the
//! arithmetic mean this stays correct across the antimeridian.

use geo::{Distance, Haversine, Point};
use crate::GpsPoint;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points in kilometres.
///
/// # Example
///
/// ```rust
/// use residential_finder::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_km(&london, &paris);
/// assert!((distance - 343.56).abs() < 1.0);
/// ```
#[inline]
pub fn haversine_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2) / 1000.0
}

// =============================================================================
// Center/Centroid Functions
// =============================================================================

/// Compute the arithmetic mean of all latitude and longitude values.
///
/// Returns (0, 0) for empty input.
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GpsPoint::new(sum_lat / n, sum_lng / n)
}

/// Compute the spherical center of gravity of a set of points.
///
/// Returns (0, 0) for empty input.
pub fn center_of_gravity(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for p in points {
        let lat = p.latitude.to_radians();
        let lng = p.longitude.to_radians();
        x += lat.cos() * lng.cos();
        y += lat.cos() * lng.sin();
        z += lat.sin();
    }

    let n = points.len() as f64;
    let (x, y, z) = (x / n, y / n, z / n);

    let latitude = z.atan2((x * x + y * y).sqrt()).to_degrees();
    let longitude = y.atan2(x).to_degrees();
    GpsPoint::new(latitude, longitude)
}

// =============================================================================
// Deviation Functions
// =============================================================================

/// Distance statistics of a point set around a center, in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationStats {
    pub mean_km: f64,
    pub max_km: f64,
    pub min_km: f64,
}

/// Mean, maximum and minimum distance from `center` to each point.
///
/// Returns `None` for empty input.
pub fn deviation_stats(points: &[GpsPoint], center: &GpsPoint) -> Option<DeviationStats> {
    if points.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    let mut max_km = 0.0_f64;
    let mut min_km = f64::INFINITY;
    for p in points {
        let d = haversine_km(center, p);
        sum += d;
        max_km = max_km.max(d);
        min_km = min_km.min(d);
    }

    Some(DeviationStats {
        mean_km: sum / points.len() as f64,
        max_km,
        min_km,
    })
}

/// Cumulative distribution of distances to `center`.
///
/// Splits `[0, max_km]` into `samples` equal steps and returns, for each upper
/// bound, the percentage of points whose distance is within that bound. The
/// last bound is `max_km`. Empty input or zero samples yield an empty vector.
pub fn deviation_cdf(
    points: &[GpsPoint],
    center: &GpsPoint,
    max_km: f64,
    samples: u32,
) -> Vec<(f64, f64)> {
    if points.is_empty() || samples == 0 {
        return Vec::new();
    }

    let mut distances: Vec<f64> = points.iter().map(|p| haversine_km(center, p)).collect();
    distances.sort_by(|a, b| a.total_cmp(b));
    let total = distances.len() as f64;

    (1..=samples)
        .map(|j| {
            let bound = max_km * (j as f64 / samples as f64);
            let within = distances.partition_point(|d| *d <= bound);
            (bound, 100.0 * within as f64 / total)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
