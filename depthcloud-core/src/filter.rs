//! Invalid sample filtering
//!
//! Pixels without a depth estimate (occlusion, out of range, no texture) come
//! out of the camera with NaN or infinite coordinates. They must never reach a
//! renderer or an exported file.

use crate::point::MeasurementRecord;

/// True when x, y and z are all finite. The color channel is not inspected.
#[inline]
pub fn is_valid(record: &MeasurementRecord) -> bool {
    record.x.is_finite() && record.y.is_finite() && record.z.is_finite()
}

/// Indices of the valid records, in their original order
pub fn valid_indices(records: &[MeasurementRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| is_valid(record))
        .map(|(i, _)| i)
        .collect()
}
