// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 30-bit Morton codes (Z-order) for points in the unit cube

use nalgebra::Point3;

/// Largest 30-bit Morton code
pub const MORTON_MAX: u32 = 0x3FFF_FFFF;

/// Spread the low 10 bits of `v` so that two zero bits follow each bit
#[inline]
pub fn expand_bits(v: u32) -> u32 {
    let mut v = v & 0x3FF;
    v = v.wrapping_mul(0x0001_0001) & 0xFF00_00FF;
    v = v.wrapping_mul(0x0000_0101) & 0x0F00_F00F;
    v = v.wrapping_mul(0x0000_0011) & 0xC30C_30C3;
    v = v.wrapping_mul(0x0000_0005) & 0x4924_9249;
    v
}

/// Quantise a unit coordinate onto the 10-bit grid `[0, 1023]`
#[inline]
fn quantize(c: f64) -> u32 {
    // NaN saturates to 0 in the cast
    (c * 1024.0).clamp(0.0, 1023.0) as u32
}

/// Morton code of a point in `[0,1]^3`.
///
/// Within each bit triplet x occupies the lowest position and z the highest.
/// Coordinates outside the unit cube are clamped.
#[inline]
pub fn morton3d(x: f64, y: f64, z: f64) -> u32 {
    let xx = expand_bits(quantize(x));
    let yy = expand_bits(quantize(y));
    let zz = expand_bits(quantize(z));
    xx | (yy << 1) | (zz << 2)
}

#[inline]
pub fn morton3d_point(p: &Point3<f64>) -> u32 {
    morton3d(p.x, p.y, p.z)
}
