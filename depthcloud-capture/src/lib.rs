//! Depth camera capture for depthcloud
//!
//! This crate provides:
//!
//! - the [`DepthCamera`] contract a sensor binding implements (grab, then
//!   retrieve an XYZRGBA measurement borrowed from the device)
//! - [`SyntheticCamera`], a software device used when no sensor is attached
//! - [`FrameProcessor`], which turns one retrieved measurement into a
//!   [`PointSet`](depthcloud_core::PointSet)
//!
//! ## Example
//!
//! ```no_run
//! use depthcloud_capture::{
//!     FrameProcessor, FrameSource, InitParameters, RuntimeParameters, SyntheticCamera,
//! };
//! use depthcloud_core::Resolution;
//!
//! let camera = SyntheticCamera::open(InitParameters::default())?;
//! let resolution = Resolution::new(720, 404);
//! let mut processor = FrameProcessor::new(camera, resolution, RuntimeParameters::default())?;
//! if let Some(points) = processor.acquire_frame()? {
//!     println!("{} valid points", points.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod camera;
pub mod error;
pub mod processor;
pub mod synthetic;

pub use camera::{
    CameraInformation, CameraResolution, DepthCamera, DepthMode, InitParameters, MeasureKind,
    Measurement, MemoryKind, RuntimeParameters, Unit,
};
pub use error::CaptureError;
pub use processor::{FrameProcessor, FrameSource, FrameStats};
pub use synthetic::SyntheticCamera;
