//! Packed color decoding
//!
//! Depth cameras deliver the color of each sample as a 32-bit value stored in
//! the fourth float channel of the measurement. The value is never used as a
//! number; its bytes are the color channels.

use crate::point::Rgb;

/// The four bytes of a packed color, lowest byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedColor(u32);

impl PackedColor {
    /// Reinterpret the bit pattern of the fourth measurement channel
    pub fn from_float(packed: f32) -> Self {
        Self(packed.to_bits())
    }

    /// Pack bytes given from least to most significant
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    pub fn to_float(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Bytes from least to most significant
    pub fn bytes(self) -> [u8; 4] {
        [
            (self.0 & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 24) & 0xFF) as u8,
        ]
    }

    pub fn alpha(self) -> u8 {
        self.bytes()[3]
    }

    /// Normalized `(r, g, b)`.
    ///
    /// Red is byte 0. Green is read from byte 2 and blue from byte 1, which is
    /// the channel order the camera's viewer output has always used. Alpha is
    /// dropped.
    pub fn to_rgb(self) -> Rgb {
        let [byte0, byte1, byte2, _alpha] = self.bytes();
        [
            f64::from(byte0) / 255.0,
            f64::from(byte2) / 255.0,
            f64::from(byte1) / 255.0,
        ]
    }
}

/// Decode one packed color channel into normalized RGB
pub fn decode_packed_color(packed: f32) -> Rgb {
    PackedColor::from_float(packed).to_rgb()
}

/// Decode every packed color independently, preserving order
pub fn decode_all<I>(packed: I) -> Vec<Rgb>
where
    I: IntoIterator<Item = f32>,
{
    packed.into_iter().map(decode_packed_color).collect()
}
