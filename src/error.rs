//! Error types for the rainfall tracker

use thiserror::Error;

/// Main error type for tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A source row violates a numeric precondition of the projection
    #[error("invalid input for grid {grid_id}: {reason}")]
    InvalidInput { grid_id: u32, reason: String },

    /// Explicit grid-ID list could not be parsed
    #[error("invalid grid ID list {input:?}: {token:?} is not an integer")]
    Parse { input: String, token: String },

    /// Grid label not present in the label map
    #[error("unknown grid label: {0}")]
    UnknownLabel(String),

    /// Projection or interval settings out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or write CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub(crate) fn invalid_input(grid_id: u32, reason: impl Into<String>) -> Self {
        TrackerError::InvalidInput {
            grid_id,
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using TrackerError
pub type Result<T> = std::result::Result<T, TrackerError>;
