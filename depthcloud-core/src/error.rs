//! Error types for depthcloud

use thiserror::Error;

/// Main error type for depthcloud operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// A caller broke a precondition, e.g. a measurement copy whose byte length
    /// does not match the frame buffer. Not recoverable.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Whether the pipeline has to stop when this error surfaces
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ContractViolation(_) | Error::Allocation(_))
    }
}

/// Result type alias for depthcloud operations
pub type Result<T> = std::result::Result<T, Error>;
