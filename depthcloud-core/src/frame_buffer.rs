//! Reusable process-owned measurement buffer
//!
//! The buffer is sized once for a fixed resolution and overwritten in place by
//! a single bulk copy per frame. [`FrameBuffer::copy_from`] is the only place
//! where device bytes are reinterpreted as records.

use crate::point::{MeasurementRecord, RECORD_BYTES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Width and height of a measurement in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of records, or `None` on overflow
    pub fn checked_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Number of bytes of a full XYZRGBA measurement, or `None` on overflow
    pub fn checked_byte_len(&self) -> Option<usize> {
        self.checked_len()?.checked_mul(RECORD_BYTES)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed-capacity buffer of `width * height` measurement records
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    resolution: Resolution,
    records: Vec<MeasurementRecord>,
}

impl FrameBuffer {
    /// Allocate a zero-filled buffer for `resolution`
    pub fn new(resolution: Resolution) -> Result<Self> {
        let len = resolution
            .checked_byte_len()
            .and_then(|_| resolution.checked_len())
            .ok_or_else(|| Error::Allocation(format!("frame size {} overflows", resolution)))?;

        let mut records = Vec::new();
        records
            .try_reserve_exact(len)
            .map_err(|e| Error::Allocation(format!("{} records for {}: {}", len, resolution, e)))?;
        records.resize(len, MeasurementRecord::default());

        Ok(Self { resolution, records })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of records, always `width * height`
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact byte length accepted by [`FrameBuffer::copy_from`]
    pub fn byte_len(&self) -> usize {
        self.records.len() * RECORD_BYTES
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    /// Overwrite the whole buffer with `byte_len` bytes of `source`.
    ///
    /// `byte_len` must equal [`FrameBuffer::byte_len`] and `source` must hold at
    /// least that many bytes. Anything else is a resolution mismatch between
    /// the device and this buffer; the buffer is left untouched and
    /// [`Error::ContractViolation`] is returned.
    pub fn copy_from(&mut self, source: &[u8], byte_len: usize) -> Result<()> {
        let expected = self.byte_len();
        if byte_len != expected {
            return Err(Error::ContractViolation(format!(
                "measurement copy of {} bytes into a {} buffer expecting {} bytes",
                byte_len, self.resolution, expected
            )));
        }
        if source.len() < byte_len {
            return Err(Error::ContractViolation(format!(
                "measurement source holds {} bytes, {} requested",
                source.len(),
                byte_len
            )));
        }

        let target: &mut [u8] = bytemuck::cast_slice_mut(&mut self.records);
        target.copy_from_slice(&source[..byte_len]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_bytes(records: &[MeasurementRecord]) -> Vec<u8> {
        bytemuck::cast_slice(records).to_vec()
    }

    #[test]
    fn test_new_is_zero_filled_with_exact_capacity() {
        let buffer = FrameBuffer::new(Resolution::new(4, 3)).unwrap();
        assert_eq!(buffer.len(), 12);
        assert_eq!(buffer.byte_len(), 12 * 16);
        assert!(buffer.records().iter().all(|r| *r == MeasurementRecord::default()));
    }

    #[test]
    fn test_new_rejects_overflowing_resolution() {
        let result = FrameBuffer::new(Resolution::new(usize::MAX, 2));
        assert!(matches!(result, Err(Error::Allocation(_))));
    }

    #[test]
    fn test_copy_from_overwrites_every_record() {
        let mut buffer = FrameBuffer::new(Resolution::new(2, 1)).unwrap();
        let source = [
            MeasurementRecord::new(1.0, 2.0, 3.0, f32::from_bits(7)),
            MeasurementRecord::new(-1.0, f32::NAN, 0.5, f32::from_bits(9)),
        ];
        let bytes = record_bytes(&source);

        buffer.copy_from(&bytes, bytes.len()).unwrap();

        assert_eq!(buffer.records()[0], source[0]);
        assert!(buffer.records()[1].y.is_nan());
        assert_eq!(buffer.records()[1].packed_color.to_bits(), 9);
    }

    #[test]
    fn test_copy_from_rejects_wrong_byte_length() {
        let mut buffer = FrameBuffer::new(Resolution::new(2, 2)).unwrap();
        let bytes = vec![0xFFu8; 64];

        assert!(matches!(buffer.copy_from(&bytes, 48), Err(Error::ContractViolation(_))));
        assert!(matches!(buffer.copy_from(&bytes, 80), Err(Error::ContractViolation(_))));
        // Untouched after a rejected copy
        assert!(buffer.records().iter().all(|r| *r == MeasurementRecord::default()));
    }

    #[test]
    fn test_copy_from_rejects_short_source() {
        let mut buffer = FrameBuffer::new(Resolution::new(2, 2)).unwrap();
        let bytes = vec![0u8; 32];
        let err = buffer.copy_from(&bytes, 64).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_copy_from_reuses_storage() {
        let mut buffer = FrameBuffer::new(Resolution::new(1, 1)).unwrap();
        let before = buffer.records().as_ptr();
        let bytes = record_bytes(&[MeasurementRecord::new(0.1, 0.2, 0.3, 0.0)]);
        buffer.copy_from(&bytes, 16).unwrap();
        buffer.copy_from(&bytes, 16).unwrap();
        assert_eq!(buffer.records().as_ptr(), before);
    }
}
