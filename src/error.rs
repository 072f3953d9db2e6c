//! Error types for log ingestion, segmentation and area discovery.
//!
//! Every variant is fatal for the batch run. Library code returns these
//! through [`Result`]; the driver decides how to report them and whether to
//! abort.

use thiserror::Error;

/// Errors that can occur while analysing a connection log.
#[derive(Error, Debug)]
pub enum ResidentialError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[cfg(feature = "output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Row does not have the expected columns
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Timestamp column could not be parsed
    #[error("invalid timestamp at line {line}: '{value}'")]
    InvalidTimestamp { line: usize, value: String },

    /// Longitude or latitude column could not be parsed
    #[error("invalid coordinate at line {line}: '{value}'")]
    InvalidCoordinate { line: usize, value: String },

    /// Lookup of a cell tag that never appeared in the log
    #[error("cell '{0}' does not exist")]
    UnknownCell(String),

    /// Segmentation was asked to work on an empty sequence
    #[error("cannot segment an empty event sequence")]
    EmptySequence,

    /// Gap threshold below zero
    #[error("invalid gap threshold: {threshold}s (must be >= 0)")]
    NegativeThreshold { threshold: i64 },

    /// Threshold outside the range an operation accepts
    #[error("invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: String },

    /// Timestamps go backwards inside a sequence that must be sorted
    #[error("events are not sorted by time at index {index}")]
    UnsortedEvents { index: usize },

    /// Negative time between two consecutive events of the chronological log
    #[error("negative elapsed time at index {index}: {seconds}s")]
    NegativeElapsedTime { index: usize, seconds: i64 },

    /// Area ids are written onto an event at most once
    #[error("event of cell '{cell_tag}' already belongs to area {existing}")]
    AreaAlreadyAssigned { cell_tag: String, existing: u32 },
}

/// Result type alias for residential analysis operations.
pub type Result<T> = std::result::Result<T, ResidentialError>;
