//! Binary16 storage grid helpers.
//!
//! BC6H stores and interpolates half float bit patterns, so the encoder works
//! on those bit patterns (held in `f32` lanes) whenever it positions texels
//! or solves for endpoints.

use half::f16;

use super::color::Vec3;

/// Largest finite half float value.
pub(crate) const HALF_MAX: f32 = 65504.0;

/// Bit pattern of [`HALF_MAX`].
pub(crate) const HALF_MAX_BITS: u16 = 0x7BFF;

#[inline(always)]
pub(crate) fn f32_to_f16(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

#[inline(always)]
pub(crate) fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

/// Converts every channel to its half float bit pattern.
#[inline]
pub(crate) fn to_half_bits(v: Vec3) -> Vec3 {
    v.map(|x| f32_to_f16(x) as f32)
}

/// Interprets every channel as a half float bit pattern.
///
/// The lanes are truncated to `u16` first, with out of range values saturating.
#[inline]
pub(crate) fn from_half_bits(v: Vec3) -> Vec3 {
    v.map(|x| f16_to_f32(x as u16))
}
