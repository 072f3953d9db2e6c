//! Tests for output module
#![cfg(feature = "output")]

use std::collections::HashMap;
use std::fs;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use residential_finder::output::*;
use residential_finder::{segment_by_speed, speed_profile, CellEvent, EventLog, GpsPoint, SpeedConfig};

fn ts(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
        + TimeDelta::seconds(secs)
}

fn labelled_log() -> EventLog {
    let mut log = EventLog::from_events(vec![
        CellEvent::new(ts(0), GpsPoint::new(25.040, 121.510), "HOME"),
        CellEvent::new(ts(60), GpsPoint::new(25.050, 121.520), "HOME"),
        CellEvent::new(ts(120), GpsPoint::new(25.100, 121.600), "ROAD"),
        CellEvent::new(ts(180), GpsPoint::new(25.045, 121.515), "HOME"),
    ]);
    log.apply_assignments(&HashMap::from([("HOME".to_string(), 1)]))
        .unwrap();
    log
}

#[test]
fn test_area_timeline_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_area_timeline(dir.path(), &labelled_log()).unwrap();
    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec!["time,areaID", "08:00:00,1", "08:01:00,1", "08:02:00,0", "08:03:00,1"]
    );
}

#[test]
fn test_area_geojson() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_area_geojson(dir.path(), &labelled_log(), 1).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("area-1.json"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(json["type"], "MultiPoint");
    let coords = json["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 3);
    assert_eq!(coords[0][0], 121.510);
    assert_eq!(coords[0][1], 25.040);
}

#[test]
fn test_midpoint_analysis_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = labelled_log();
    let config = MidpointConfig { cdf_samples: 10 };

    for method in [MidpointMethod::Gravity, MidpointMethod::Average] {
        let summaries = write_midpoint_analysis(dir.path(), &log, 1, method, &config).unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.area, 1);
        assert!((summary.center.latitude - 25.045).abs() < 0.001);
        assert!(summary.deviation.min_km <= summary.deviation.mean_km);
        assert!(summary.deviation.mean_km <= summary.deviation.max_km);

        let text = fs::read_to_string(dir.path().join(format!("{}-area-1.csv", method.name()))).unwrap();
        let rows: Vec<(f64, f64)> = text
            .lines()
            .map(|l| {
                let (a, b) = l.split_once(',').unwrap();
                (a.parse().unwrap(), b.parse().unwrap())
            })
            .collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[9].1, 100.0);
    }
}

#[test]
fn test_midpoint_skips_empty_area() {
    let dir = tempfile::tempdir().unwrap();
    let summaries = write_midpoint_analysis(
        dir.path(),
        &labelled_log(),
        2,
        MidpointMethod::Average,
        &MidpointConfig::default(),
    )
    .unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(!dir.path().join("average-area-2.csv").exists());
}

#[test]
fn test_geo_files() {
    let dir = tempfile::tempdir().unwrap();
    write_geo_files(dir.path(), &labelled_log(), 1).unwrap();
    let lon = fs::read_to_string(dir.path().join("area-1-lon.txt")).unwrap();
    let lat = fs::read_to_string(dir.path().join("area-1-lat.txt")).unwrap();
    assert_eq!(lon.lines().collect::<Vec<_>>(), vec!["121.51", "121.52", "121.515"]);
    assert_eq!(lat.lines().count(), 3);
}

#[test]
fn test_speed_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::from_events(vec![
        CellEvent::new(ts(0), GpsPoint::new(25.04, 121.51), "HOME"),
        CellEvent::new(ts(900), GpsPoint::new(25.04, 121.51), "HOME"),
        CellEvent::new(ts(1000), GpsPoint::new(25.14, 121.51), "FAR"),
    ]);

    let segments = segment_by_speed(log.events(), &SpeedConfig::default()).unwrap();
    let paths = write_speed_segments_geojson(dir.path(), log.events(), &segments).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("map-by-speed-1-080000-to-081500.json"));

    let profile = write_speed_profile(dir.path(), &speed_profile(log.events()).unwrap()).unwrap();
    let text = fs::read_to_string(profile).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "time,speed");
    assert_eq!(lines[1], "08:15:00,0");
    assert!(lines[2].starts_with("08:16:40,"));
}
