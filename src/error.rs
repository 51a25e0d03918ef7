//! Error types for grid generation, assignment, and export.

use thiserror::Error;

/// Errors surfaced by the grid aggregation engine.
///
/// Per-sample problems (non-finite coordinates, missing channel values) are
/// never errors; they are recovered by exclusion and reported through
/// [`crate::assign::AssignmentReport`]. Only configuration and export
/// failures abort a call.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
