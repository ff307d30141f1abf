//! Point and measurement record types

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use bytemuck::{Pod, Zeroable};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// Normalized RGB color, each channel in `[0, 1]`
pub type Rgb = [f64; 3];

/// Number of 32-bit channels in one measurement record
pub const RECORD_CHANNELS: usize = 4;

/// Size in bytes of one measurement record
pub const RECORD_BYTES: usize = RECORD_CHANNELS * std::mem::size_of::<f32>();

/// One sample of an XYZRGBA measurement, laid out exactly as the device writes it.
///
/// `packed_color` is not a number: its bit pattern carries four color bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct MeasurementRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub packed_color: f32,
}

impl MeasurementRecord {
    pub fn new(x: f32, y: f32, z: f32, packed_color: f32) -> Self {
        Self { x, y, z, packed_color }
    }

    /// Position channels as-is
    pub fn position(&self) -> Point3f {
        Point3f::new(self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout_matches_device_stride() {
        assert_eq!(std::mem::size_of::<MeasurementRecord>(), RECORD_BYTES);
        assert_eq!(RECORD_BYTES, 16);
    }

    #[test]
    fn test_record_bytes_are_channel_ordered() {
        let record = MeasurementRecord::new(1.0, 2.0, 3.0, f32::from_bits(0xAABBCCDD));
        let bytes = bytemuck::bytes_of(&record);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &3.0f32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &0xAABBCCDDu32.to_ne_bytes());
    }
}
