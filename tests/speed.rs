//! Tests for speed module

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use residential_finder::geo_utils::haversine_km;
use residential_finder::{segment_by_speed, speed_profile, CellEvent, EventLog, GpsPoint, SpeedConfig};

fn ts(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + TimeDelta::seconds(secs)
}

fn event(secs: i64, lat: f64, lon: f64, tag: &str) -> CellEvent {
    CellEvent::new(ts(secs), GpsPoint::new(lat, lon), tag)
}

#[test]
fn test_one_km_per_hour_is_stationary() {
    let a = GpsPoint::new(25.0, 121.5);
    let b = GpsPoint::new(25.008993, 121.5);
    let km = haversine_km(&a, &b);
    assert!((km - 1.0).abs() < 0.01);
    let speed = km * 1.1 / 3600.0;
    assert!((speed - 0.000306).abs() < 0.00001);

    let events = vec![
        CellEvent::new(ts(0), a, "A"),
        CellEvent::new(ts(3600), b, "B"),
    ];
    let segments = segment_by_speed(&events, &SpeedConfig::default()).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].event_count(), 2);
}

#[test]
fn test_day_with_commute() {
    // Home from 00:00 to 08:00, a fast commute, work until 17:00
    let mut events = Vec::new();
    for i in 0..=16 {
        events.push(event(i * 1800, 25.04, 121.51, "HOME"));
    }
    events.push(event(29_100, 25.045, 121.40, "ROAD")); // ~11 km in 300s
    events.push(event(29_400, 25.05, 121.30, "WORK")); // ~10 km in 300s
    for i in 1..=18 {
        events.push(event(29_400 + i * 1800, 25.05, 121.30, "WORK"));
    }
    let log = EventLog::from_events(events);

    let segments = segment_by_speed(log.events(), &SpeedConfig::default()).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(log.events()[segments[0].end_index].cell_tag, "HOME");
    assert_eq!(segments[0].duration_secs(), 16 * 1800);
    assert_eq!(log.events()[segments[1].start_index].cell_tag, "WORK");
    assert_eq!(segments[1].end_index, log.len() - 1);
}

#[test]
fn test_custom_threshold_keeps_walk_together() {
    // ~2 km in 10 minutes is a walk under the default threshold but movement
    // under a 1 km/h threshold
    let events = vec![
        event(0, 25.0, 121.5, "A"),
        event(1200, 25.0, 121.5, "A"),
        event(1800, 25.018, 121.5, "B"),
        event(3000, 25.018, 121.5, "B"),
    ];
    let lenient = segment_by_speed(&events, &SpeedConfig::default()).unwrap();
    assert_eq!(lenient.len(), 1);

    let strict = SpeedConfig {
        speed_threshold_km_s: 1.0 / 3600.0,
        ..Default::default()
    };
    let split = segment_by_speed(&events, &strict).unwrap();
    assert_eq!(split.len(), 2);
}

#[test]
fn test_speed_profile_km_per_hour() {
    let events = vec![event(0, 25.0, 121.5, "A"), event(600, 25.04497, 121.5, "A")];
    let samples = speed_profile(&events).unwrap();
    // ~5 km in 10 minutes
    assert!((samples[0].speed_kmh - 30.0).abs() < 0.5);
}
