//! Per-frame acquisition: grab, copy, filter, decode

use depthcloud_core::{
    decode_all, valid_indices, Error, FrameBuffer, PointSet, Resolution, Result,
};
use tracing::debug;

use crate::camera::{DepthCamera, MeasureKind, MemoryKind, RuntimeParameters};
use crate::error::CaptureError;

/// Something that yields the next point set on demand.
///
/// `Ok(None)` means no new frame this time; the caller keeps polling.
/// An `Err` is not recoverable.
pub trait FrameSource {
    fn acquire_frame(&mut self) -> Result<Option<PointSet>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn acquire_frame(&mut self) -> Result<Option<PointSet>> {
        (**self).acquire_frame()
    }
}

/// Frame counters kept by a [`FrameProcessor`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames turned into a point set
    pub processed: u64,
    /// Grab or retrieve calls that produced nothing
    pub dropped: u64,
    /// Valid points in the last processed frame
    pub last_point_count: usize,
}

/// Turns camera measurements into point sets, reusing one [`FrameBuffer`]
pub struct FrameProcessor<C: DepthCamera> {
    camera: C,
    runtime: RuntimeParameters,
    buffer: FrameBuffer,
    stats: FrameStats,
}

impl<C: DepthCamera> FrameProcessor<C> {
    /// Take ownership of `camera` and size the frame buffer for `resolution`.
    ///
    /// Fails with [`Error::ContractViolation`] when `resolution` is empty or
    /// larger than the sensor delivers; no frame could ever be retrieved.
    pub fn new(camera: C, resolution: Resolution, runtime: RuntimeParameters) -> Result<Self> {
        let native = camera.camera_information().resolution;
        if resolution.width == 0
            || resolution.height == 0
            || resolution.width > native.width
            || resolution.height > native.height
        {
            return Err(Error::ContractViolation(format!(
                "cannot retrieve {} from a {} sensor",
                resolution, native
            )));
        }

        let buffer = FrameBuffer::new(resolution)?;
        Ok(Self {
            camera,
            runtime,
            buffer,
            stats: FrameStats::default(),
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.buffer.resolution()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// Build the point set from whatever the buffer currently holds
    fn points_from_buffer(&self) -> PointSet {
        let records = self.buffer.records();
        let indices = valid_indices(records);

        let colors = decode_all(indices.iter().map(|&i| records[i].packed_color));

        let mut points = PointSet::with_capacity(indices.len());
        for (&i, color) in indices.iter().zip(colors) {
            points.push(records[i].position(), color);
        }
        points
    }
}

impl<C: DepthCamera> FrameSource for FrameProcessor<C> {
    fn acquire_frame(&mut self) -> Result<Option<PointSet>> {
        if let Err(e) = self.camera.grab(&self.runtime) {
            debug!("No frame: {}", e);
            self.stats.dropped += 1;
            return Ok(None);
        }

        let resolution = self.buffer.resolution();
        let measurement = match self
            .camera
            .retrieve_measure(MeasureKind::XyzRgba, MemoryKind::Cpu, resolution)
        {
            Ok(measurement) => measurement,
            Err(CaptureError::UnsupportedResolution(message)) => {
                return Err(Error::ContractViolation(message));
            }
            Err(e) => {
                debug!("No frame: {}", e);
                self.stats.dropped += 1;
                return Ok(None);
            }
        };

        self.buffer.copy_from(measurement.bytes(), measurement.byte_len())?;

        let points = self.points_from_buffer();
        self.stats.processed += 1;
        self.stats.last_point_count = points.len();
        debug!("Frame {}: {} valid points", self.stats.processed, points.len());

        Ok(Some(points))
    }
}

impl<C: DepthCamera> Drop for FrameProcessor<C> {
    fn drop(&mut self) {
        self.camera.close();
    }
}
