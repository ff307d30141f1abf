//! Errors reported by camera bindings

use thiserror::Error;

/// Errors that can occur while talking to a depth camera
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    #[error("Failed to grab frame: {0}")]
    GrabFailed(String),

    #[error("Failed to retrieve measurement: {0}")]
    RetrieveFailed(String),

    #[error("Unsupported resolution: {0}")]
    UnsupportedResolution(String),

    #[error("Camera is closed")]
    Closed,
}

impl From<CaptureError> for depthcloud_core::Error {
    fn from(e: CaptureError) -> Self {
        depthcloud_core::Error::Capture(e.to_string())
    }
}
