//! Split a day of connections into stationary segments by travel speed.
//!
//! Run with: cargo run --example speed_segments

use chrono::{NaiveDate, TimeDelta};
use residential_finder::{segment_by_speed, CellEvent, EventLog, GpsPoint, SpeedConfig};

fn main() {
    let base = NaiveDate::from_ymd_opt(2019, 3, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();

    let home = GpsPoint::new(25.0457, 121.5126);
    let work = GpsPoint::new(25.0510, 121.2993);

    let mut events = Vec::new();
    for i in 0..6 {
        events.push(CellEvent::new(base + TimeDelta::minutes(i * 20), home, "CELL_133"));
    }
    // Highway commute
    events.push(CellEvent::new(base + TimeDelta::minutes(110), GpsPoint::new(25.048, 121.40), "CELL_502"));
    for i in 0..10 {
        events.push(CellEvent::new(base + TimeDelta::minutes(120 + i * 30), work, "CELL_871"));
    }

    let log = EventLog::from_events(events);
    let config = SpeedConfig::default();
    let segments = segment_by_speed(log.events(), &config).unwrap();

    println!("Speed Segmentation\n");
    println!(
        "Config: threshold={} km/s, upscale={}, min_dwell={}s\n",
        config.speed_threshold_km_s, config.distance_upscale_factor, config.min_dwell_secs
    );

    for (n, segment) in segments.iter().enumerate() {
        println!(
            "{}. {} -> {} ({} events, {} min) at {}",
            n + 1,
            segment.start.format("%H:%M"),
            segment.end.format("%H:%M"),
            segment.event_count(),
            segment.duration_secs() / 60,
            log.events()[segment.start_index].cell_tag
        );
    }
}
