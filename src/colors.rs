//! RGB color helpers.
//!
//! Colors are stored as [`Vec3`] with components nominally in `[0, 1]`.
//! Shading may overshoot; values are only clamped when converted to bytes.

use crate::math::Vec3;

pub type Color = Vec3;

pub const BLACK: Color = Vec3::new(0.0, 0.0, 0.0);
pub const WHITE: Color = Vec3::new(1.0, 1.0, 1.0);

/// Neutral normal written to pixels that no triangle covered.
pub const NEUTRAL_NORMAL: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Convert a float color to 8-bit RGB, clamping each channel.
#[inline]
pub fn to_rgb8(color: Color) -> [u8; 3] {
    let channel = |v: f32| (v * 255.0).clamp(0.0, 255.0) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Convert 8-bit RGB to a float color in `[0, 1]`.
#[inline]
pub fn from_rgb8(rgb: [u8; 3]) -> Color {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}
