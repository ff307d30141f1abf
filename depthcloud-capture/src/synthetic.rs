//! Software depth camera.
//!
//! Produces a rippling colored surface about 1.5 m in front of the sensor, with
//! the same kinds of invalid samples a stereo camera reports: a moving
//! occluder without depth, an out-of-range band at the top of the image and
//! scattered low-confidence pixels.

use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use depthcloud_core::{MeasurementRecord, PackedColor, Resolution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::camera::{
    CameraInformation, DepthCamera, InitParameters, MeasureKind, Measurement, MemoryKind,
    RuntimeParameters,
};
use crate::error::CaptureError;

const MODEL: &str = "Synthetic Stereo";
const MAX_FPS: u32 = 120;

/// Tangent of half the horizontal field of view (90 degrees)
const TAN_HALF_HFOV: f32 = 1.0;

/// A software camera implementing [`DepthCamera`]
pub struct SyntheticCamera {
    init: InitParameters,
    serial_number: u32,
    opened: bool,
    frame_index: u64,
    confidence_threshold: u8,
    next_frame_at: Option<Instant>,
    rng: StdRng,
    staging: Vec<MeasurementRecord>,
}

impl SyntheticCamera {
    /// Open a synthetic camera with serial number 0
    pub fn open(init: InitParameters) -> Result<Self, CaptureError> {
        Self::open_with_serial(init, 0)
    }

    /// Open a synthetic camera. The serial number seeds the noise, so two
    /// cameras with the same serial produce identical frames.
    pub fn open_with_serial(
        init: InitParameters,
        serial_number: u32,
    ) -> Result<Self, CaptureError> {
        if init.camera_fps > MAX_FPS {
            return Err(CaptureError::OpenFailed(format!(
                "{} fps requested, at most {} supported",
                init.camera_fps, MAX_FPS
            )));
        }

        info!(
            "Opened {} camera {} at {} ({:?}, {:?})",
            MODEL,
            serial_number,
            init.camera_resolution.size(),
            init.depth_mode,
            init.coordinate_units
        );

        Ok(Self {
            init,
            serial_number,
            opened: true,
            frame_index: 0,
            confidence_threshold: RuntimeParameters::default().confidence_threshold,
            next_frame_at: None,
            rng: StdRng::seed_from_u64(u64::from(serial_number)),
            staging: Vec::new(),
        })
    }

    /// Number of frames grabbed so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn wait_for_next_frame(&mut self) {
        if self.init.camera_fps == 0 {
            return;
        }
        let period = Duration::from_secs_f64(1.0 / f64::from(self.init.camera_fps));
        let now = Instant::now();
        let deadline = self.next_frame_at.unwrap_or(now);
        if deadline > now {
            thread::sleep(deadline - now);
        }
        self.next_frame_at = Some(deadline.max(now) + period);
    }

    fn render(&mut self, resolution: Resolution) {
        let t = self.frame_index as f32 / 30.0;
        let scale = self.init.coordinate_units.per_meter();
        let threshold = self.confidence_threshold;
        let (width, height) = (resolution.width as f32, resolution.height as f32);
        let tan_half_vfov = TAN_HALF_HFOV * height / width;

        let occluder_u = 0.5 + 0.3 * (0.7 * t).cos();
        let occluder_v = 0.55;
        let occluder_radius = 0.08;

        for (i, record) in self.staging.iter_mut().enumerate() {
            let u = (i % resolution.width) as f32;
            let v = (i / resolution.width) as f32;
            let nu = (u + 0.5) / width;
            let nv = (v + 0.5) / height;

            let red = (nu * 255.0) as u8;
            let green = (nv * 255.0) as u8;
            let blue = ((0.5 + 0.5 * t.sin()) * 255.0) as u8;
            // Byte 1 is read back as blue and byte 2 as green.
            let packed_color = PackedColor::from_bytes([red, blue, green, 255]).to_float();

            let confidence: u8 = self.rng.gen_range(1..=100);
            let occluded = (nu - occluder_u).powi(2) + (nv - occluder_v).powi(2)
                < occluder_radius * occluder_radius;

            *record = if occluded || confidence > threshold {
                MeasurementRecord::new(f32::NAN, f32::NAN, f32::NAN, packed_color)
            } else if nv < 0.1 {
                MeasurementRecord::new(f32::INFINITY, f32::INFINITY, f32::INFINITY, packed_color)
            } else {
                let depth = 1.5 + 0.15 * (TAU * 2.0 * nu + t).sin() * (TAU * nv + 0.5 * t).cos();
                let ray_x = (nu - 0.5) * 2.0 * TAN_HALF_HFOV;
                let ray_y = (nv - 0.5) * 2.0 * tan_half_vfov;
                MeasurementRecord::new(
                    ray_x * depth * scale,
                    ray_y * depth * scale,
                    depth * scale,
                    packed_color,
                )
            };
        }
    }
}

impl DepthCamera for SyntheticCamera {
    fn grab(&mut self, runtime: &RuntimeParameters) -> Result<(), CaptureError> {
        if !self.opened {
            return Err(CaptureError::Closed);
        }
        self.wait_for_next_frame();
        self.confidence_threshold = runtime.confidence_threshold;
        self.frame_index += 1;
        Ok(())
    }

    fn retrieve_measure(
        &mut self,
        kind: MeasureKind,
        memory: MemoryKind,
        resolution: Resolution,
    ) -> Result<Measurement<'_>, CaptureError> {
        if !self.opened {
            return Err(CaptureError::Closed);
        }
        if self.frame_index == 0 {
            return Err(CaptureError::RetrieveFailed("no frame has been grabbed".to_string()));
        }
        match memory {
            MemoryKind::Cpu => {}
        }

        let native = self.init.camera_resolution.size();
        if resolution.width == 0
            || resolution.height == 0
            || resolution.width > native.width
            || resolution.height > native.height
        {
            return Err(CaptureError::UnsupportedResolution(format!(
                "{} requested from a {} sensor",
                resolution, native
            )));
        }

        let len = resolution.width * resolution.height;
        self.staging.resize(len, MeasurementRecord::default());
        self.render(resolution);
        debug!("Rendered synthetic frame {} at {}", self.frame_index, resolution);

        Ok(Measurement::new(
            bytemuck::cast_slice(&self.staging),
            resolution,
            kind,
        ))
    }

    fn camera_information(&self) -> CameraInformation {
        CameraInformation {
            model: MODEL.to_string(),
            serial_number: self.serial_number,
            resolution: self.init.camera_resolution.size(),
        }
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn close(&mut self) {
        if self.opened {
            self.opened = false;
            self.staging = Vec::new();
            info!(
                "Closed {} camera {} after {} frames",
                MODEL, self.serial_number, self.frame_index
            );
        }
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraResolution, Unit};
    use depthcloud_core::valid_indices;

    fn unpaced() -> InitParameters {
        InitParameters {
            camera_fps: 0,
            ..Default::default()
        }
    }

    fn xyz_rgba(
        camera: &mut SyntheticCamera,
        resolution: Resolution,
    ) -> Result<Measurement<'_>, CaptureError> {
        camera.retrieve_measure(MeasureKind::XyzRgba, MemoryKind::Cpu, resolution)
    }

    fn records(measurement: &Measurement<'_>) -> Vec<MeasurementRecord> {
        bytemuck::cast_slice::<u8, MeasurementRecord>(measurement.bytes()).to_vec()
    }

    #[test]
    fn test_open_rejects_excessive_fps() {
        let init = InitParameters {
            camera_fps: 500,
            ..Default::default()
        };
        assert!(matches!(SyntheticCamera::open(init), Err(CaptureError::OpenFailed(_))));
    }

    #[test]
    fn test_retrieve_before_grab_fails() {
        let mut camera = SyntheticCamera::open(unpaced()).unwrap();
        let result = xyz_rgba(&mut camera, Resolution::new(8, 4));
        assert!(matches!(result, Err(CaptureError::RetrieveFailed(_))));
    }

    #[test]
    fn test_measurement_has_full_byte_length() {
        let mut camera = SyntheticCamera::open(unpaced()).unwrap();
        camera.grab(&RuntimeParameters::default()).unwrap();
        let measurement = camera
            .retrieve_measure(MeasureKind::XyzRgba, MemoryKind::Cpu, Resolution::new(72, 40))
            .unwrap();
        assert_eq!(measurement.byte_len(), 72 * 40 * 16);
        assert_eq!(measurement.resolution(), Resolution::new(72, 40));
    }

    #[test]
    fn test_rejects_resolution_above_sensor() {
        let init = InitParameters {
            camera_resolution: CameraResolution::Vga,
            ..unpaced()
        };
        let mut camera = SyntheticCamera::open(init).unwrap();
        camera.grab(&RuntimeParameters::default()).unwrap();
        let result = xyz_rgba(&mut camera, Resolution::new(1280, 720));
        assert!(matches!(result, Err(CaptureError::UnsupportedResolution(_))));
    }

    #[test]
    fn test_frames_mix_valid_and_invalid_samples() {
        let mut camera = SyntheticCamera::open(unpaced()).unwrap();
        camera.grab(&RuntimeParameters::default()).unwrap();
        let measurement = camera
            .retrieve_measure(MeasureKind::XyzRgba, MemoryKind::Cpu, Resolution::new(64, 48))
            .unwrap();
        let records = records(&measurement);
        let valid = valid_indices(&records).len();
        assert!(valid > 0);
        assert!(valid < records.len());
    }

    #[test]
    fn test_units_scale_coordinates() {
        let resolution = Resolution::new(16, 16);
        let runtime = RuntimeParameters { confidence_threshold: 100 };

        let mut meters = SyntheticCamera::open(unpaced()).unwrap();
        let mut millimeters = SyntheticCamera::open(InitParameters {
            coordinate_units: Unit::Millimeter,
            ..unpaced()
        })
        .unwrap();

        meters.grab(&runtime).unwrap();
        millimeters.grab(&runtime).unwrap();
        let m = records(&xyz_rgba(&mut meters, resolution).unwrap());
        let mm = records(&xyz_rgba(&mut millimeters, resolution).unwrap());

        let i = valid_indices(&m)[0];
        approx::assert_relative_eq!(mm[i].z, m[i].z * 1000.0, max_relative = 1e-5);
    }

    #[test]
    fn test_closed_camera_refuses_grab() {
        let mut camera = SyntheticCamera::open(unpaced()).unwrap();
        camera.close();
        assert!(!camera.is_opened());
        assert!(matches!(camera.grab(&RuntimeParameters::default()), Err(CaptureError::Closed)));
    }

    #[test]
    fn test_same_serial_gives_same_frames() {
        let resolution = Resolution::new(20, 10);
        let mut a = SyntheticCamera::open_with_serial(unpaced(), 7).unwrap();
        let mut b = SyntheticCamera::open_with_serial(unpaced(), 7).unwrap();
        a.grab(&RuntimeParameters::default()).unwrap();
        b.grab(&RuntimeParameters::default()).unwrap();
        let ra = xyz_rgba(&mut a, resolution).unwrap().bytes().to_vec();
        let rb = xyz_rgba(&mut b, resolution).unwrap().bytes().to_vec();
        assert_eq!(ra, rb);
    }
}
