//! Reading connection logs.
//!
//! Input is one record per line with a header row:
//!
//! ```text
//! time	lon	lat	cell
//! 2019-03-01 08:00:05	121.5125	25.0456	CELL_133
//! ```
//!
//! Columns are `timestamp, longitude, latitude, cell_tag`, separated by tabs or
//! commas (decided per line). Timestamps use [`TIMESTAMP_FORMAT`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use log::info;

use crate::error::{ResidentialError, Result};
use crate::event_log::{CellEvent, EventLog};
use crate::GpsPoint;

/// Calendar format of the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read and partition a log file.
pub fn read_event_log(path: impl AsRef<Path>) -> Result<EventLog> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let log = parse_event_log(BufReader::new(file))?;
    info!(
        "[Ingest] Loaded {} events in {} cells from {}",
        log.len(),
        log.groups().len(),
        path.display()
    );
    Ok(log)
}

/// Parse a log from any buffered reader. The first line is a header.
///
/// # Example
///
/// ```rust
/// use residential_finder::ingest::parse_event_log;
///
/// let data = "time,lon,lat,cell\n2019-03-01 08:00:05,121.5125,25.0456,CELL_133\n";
/// let log = parse_event_log(data.as_bytes()).unwrap();
/// assert_eq!(log.num_connections("CELL_133").unwrap(), 1);
/// ```
pub fn parse_event_log<R: BufRead>(reader: R) -> Result<EventLog> {
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            continue;
        }
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        events.push(parse_row(line, idx + 1)?);
    }

    Ok(EventLog::from_events(events))
}

fn parse_row(line: &str, line_no: usize) -> Result<CellEvent> {
    let delimiter = if line.contains('\t') { '\t' } else { ',' };
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() < 4 {
        return Err(ResidentialError::MalformedRow {
            line: line_no,
            reason: format!("expected 4 columns, found {}", fields.len()),
        });
    }

    let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).map_err(|_| {
        ResidentialError::InvalidTimestamp {
            line: line_no,
            value: fields[0].to_string(),
        }
    })?;
    let longitude = parse_coordinate(fields[1], line_no)?;
    let latitude = parse_coordinate(fields[2], line_no)?;

    let point = GpsPoint::new(latitude, longitude);
    if !point.is_valid() {
        return Err(ResidentialError::InvalidCoordinate {
            line: line_no,
            value: format!("{},{}", fields[1], fields[2]),
        });
    }

    let tag = fields[3];
    if tag.is_empty() {
        return Err(ResidentialError::MalformedRow {
            line: line_no,
            reason: "empty cell tag".to_string(),
        });
    }

    Ok(CellEvent::new(timestamp, point, tag))
}

fn parse_coordinate(value: &str, line_no: usize) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| ResidentialError::InvalidCoordinate {
            line: line_no,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_separated() {
        let data = "time\tlon\tlat\tcell\n\
                    2019-03-01 08:10:00\t121.5\t25.0\tB\n\
                    2019-03-01 08:00:00\t121.6\t25.1\tA\n";
        let log = parse_event_log(data.as_bytes()).unwrap();
        assert_eq!(log.len(), 2);
        // Sorted chronologically after ingestion
        assert_eq!(log.events()[0].cell_tag, "A");
        assert_eq!(log.events()[0].point, GpsPoint::new(25.1, 121.6));
    }

    #[test]
    fn test_parse_comma_with_crlf_and_blank_lines() {
        let data = "time,lon,lat,cell\r\n2019-03-01 08:00:00,121.5,25.0,A\r\n\r\n";
        let log = parse_event_log(data.as_bytes()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].cell_tag, "A");
    }

    #[test]
    fn test_header_only() {
        let log = parse_event_log("time,lon,lat,cell\n".as_bytes()).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_invalid_timestamp() {
        let data = "h\n2019/03/01 08:00,121.5,25.0,A\n";
        assert!(matches!(
            parse_event_log(data.as_bytes()),
            Err(ResidentialError::InvalidTimestamp { line: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_coordinate() {
        let data = "h\n2019-03-01 08:00:00,abc,25.0,A\n";
        assert!(matches!(
            parse_event_log(data.as_bytes()),
            Err(ResidentialError::InvalidCoordinate { line: 2, .. })
        ));
        let data = "h\n2019-03-01 08:00:00,121.5,95.0,A\n";
        assert!(matches!(
            parse_event_log(data.as_bytes()),
            Err(ResidentialError::InvalidCoordinate { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_columns() {
        let data = "h\n2019-03-01 08:00:00,121.5,25.0\n";
        assert!(matches!(
            parse_event_log(data.as_bytes()),
            Err(ResidentialError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_event_log("/nonexistent/data.csv"),
            Err(ResidentialError::Io(_))
        ));
    }
}
