//! Discover residential areas in a synthetic three-day log.
//!
//! Run with: cargo run --example basic_discovery

use chrono::{NaiveDate, TimeDelta};
use residential_finder::{discover_residential_areas, CellEvent, DiscoveryConfig, EventLog, GpsPoint};

fn main() {
    let base = NaiveDate::from_ymd_opt(2019, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    // Nights near Taipei Main Station, days in Taoyuan, a few pings in between
    let home = [("CELL_133", GpsPoint::new(25.0457, 121.5126)), ("CELL_134", GpsPoint::new(25.0470, 121.5140))];
    let work = GpsPoint::new(25.0510, 121.2993);

    let mut events = Vec::new();
    for day in 0..3 {
        let midnight = base + TimeDelta::days(day);
        for i in 0..60 {
            let (tag, point) = home[(i % 2) as usize];
            events.push(CellEvent::new(midnight + TimeDelta::seconds(i * 240), point, tag));
        }
        for i in 0..40 {
            events.push(CellEvent::new(
                midnight + TimeDelta::hours(10) + TimeDelta::seconds(i * 300),
                work,
                "CELL_871",
            ));
        }
        events.push(CellEvent::new(
            midnight + TimeDelta::hours(9),
            GpsPoint::new(25.0480, 121.4000),
            "CELL_502",
        ));
    }

    let mut log = EventLog::from_events(events);
    let config = DiscoveryConfig::default();
    let result = discover_residential_areas(&log, log.ranker(), &config).unwrap();
    log.apply_assignments(&result.assignments).unwrap();

    println!("Residential Area Discovery\n");
    println!(
        "Config: gap_threshold={}s, min_stay={}s\n",
        config.gap_threshold_secs, config.min_stay_secs
    );

    for area in &result.areas {
        let points = log.area_points(area.id);
        let center = residential_finder::geo_utils::compute_center(&points);
        println!("Area {}:", area.id);
        println!("  Cells: {}", area.cell_tags.join(", "));
        println!("  Intervals: {}", area.intervals.len());
        println!("  Events: {}", points.len());
        println!("  Center: {:.5}, {:.5}\n", center.latitude, center.longitude);
    }

    let unassigned = log.events().iter().filter(|e| e.area().id() == 0).count();
    println!("Unassigned events: {}", unassigned);
}
