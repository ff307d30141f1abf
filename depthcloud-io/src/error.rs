//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },
}

impl From<IoError> for depthcloud_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::InvalidFormat { format } => depthcloud_core::Error::UnsupportedFormat(format),
            IoError::ParseError { message } => depthcloud_core::Error::InvalidData(message),
            IoError::WriteError { message } => depthcloud_core::Error::Export(message),
        }
    }
}
