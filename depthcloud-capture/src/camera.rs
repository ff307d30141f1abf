//! Depth camera contract and configuration

use crate::error::CaptureError;
use depthcloud_core::Resolution;
use serde::{Deserialize, Serialize};

/// Sensor resolution selected when the camera is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraResolution {
    Hd2k,
    Hd1080,
    Hd720,
    Vga,
}

impl CameraResolution {
    /// Native image size of this mode
    pub fn size(self) -> Resolution {
        match self {
            CameraResolution::Hd2k => Resolution::new(2208, 1242),
            CameraResolution::Hd1080 => Resolution::new(1920, 1080),
            CameraResolution::Hd720 => Resolution::new(1280, 720),
            CameraResolution::Vga => Resolution::new(672, 376),
        }
    }
}

/// Quality/speed trade-off of the depth estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthMode {
    Performance,
    Quality,
    Ultra,
    Neural,
}

/// Unit of the measured coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Millimeter,
    Centimeter,
    Meter,
}

impl Unit {
    /// How many of this unit make one meter
    pub fn per_meter(self) -> f32 {
        match self {
            Unit::Millimeter => 1000.0,
            Unit::Centimeter => 100.0,
            Unit::Meter => 1.0,
        }
    }
}

/// Startup configuration, fixed for the lifetime of the camera handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitParameters {
    pub camera_resolution: CameraResolution,
    pub depth_mode: DepthMode,
    pub coordinate_units: Unit,
    /// Frames per second; 0 lets the device run as fast as it can
    pub camera_fps: u32,
}

impl Default for InitParameters {
    fn default() -> Self {
        Self {
            camera_resolution: CameraResolution::Hd720,
            depth_mode: DepthMode::Ultra,
            coordinate_units: Unit::Meter,
            camera_fps: 30,
        }
    }
}

/// Per-grab configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeParameters {
    /// Depth samples whose confidence value exceeds this threshold (1-100)
    /// are reported as invalid. 100 keeps everything.
    pub confidence_threshold: u8,
}

impl Default for RuntimeParameters {
    fn default() -> Self {
        Self {
            confidence_threshold: 95,
        }
    }
}

/// Kind of measurement to retrieve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MeasureKind {
    /// Four 32-bit channels per pixel: x, y, z and a packed color
    XyzRgba,
}

/// Where the retrieved measurement lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemoryKind {
    Cpu,
}

/// Identification reported by an opened camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInformation {
    pub model: String,
    pub serial_number: u32,
    pub resolution: Resolution,
}

/// A measurement owned by the camera.
///
/// It borrows the camera, so it is gone before the next grab can overwrite
/// the device memory it points into.
#[derive(Debug, Clone, Copy)]
pub struct Measurement<'a> {
    bytes: &'a [u8],
    resolution: Resolution,
    kind: MeasureKind,
}

impl<'a> Measurement<'a> {
    pub fn new(bytes: &'a [u8], resolution: Resolution, kind: MeasureKind) -> Self {
        Self { bytes, resolution, kind }
    }

    /// Raw device memory of the measurement
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }
}

/// An opened depth camera.
///
/// Implementations are acquired by a constructor taking [`InitParameters`]
/// and release the device when closed or dropped.
pub trait DepthCamera {
    /// Wait for and capture the next frame
    fn grab(&mut self, runtime: &RuntimeParameters) -> Result<(), CaptureError>;

    /// Retrieve a measurement of the last grabbed frame at `resolution`
    fn retrieve_measure(
        &mut self,
        kind: MeasureKind,
        memory: MemoryKind,
        resolution: Resolution,
    ) -> Result<Measurement<'_>, CaptureError>;

    fn camera_information(&self) -> CameraInformation;

    fn is_opened(&self) -> bool;

    /// Release the device. Further grabs fail with [`CaptureError::Closed`].
    fn close(&mut self);
}

impl<C: DepthCamera + ?Sized> DepthCamera for Box<C> {
    fn grab(&mut self, runtime: &RuntimeParameters) -> Result<(), CaptureError> {
        (**self).grab(runtime)
    }

    fn retrieve_measure(
        &mut self,
        kind: MeasureKind,
        memory: MemoryKind,
        resolution: Resolution,
    ) -> Result<Measurement<'_>, CaptureError> {
        (**self).retrieve_measure(kind, memory, resolution)
    }

    fn camera_information(&self) -> CameraInformation {
        (**self).camera_information()
    }

    fn is_opened(&self) -> bool {
        (**self).is_opened()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
