// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fixed` module provides the fixed-point arithmetic primitives used throughout the SBR/PS
//! signal path.
//!
//! Samples and coefficients are 32-bit signed integers in Q29, Q30, or Q31 format (the number of
//! fractional bits is implicit from context), or 16-bit Q15. All products are formed in 64 bits
//! and truncated, never rounded, so results are bit-exact and platform independent.

/// One (1.0) in Q31 format, i.e. the largest representable positive Q31 value.
pub const Q31_ONE: i32 = 0x7fff_ffff;

/// One (1.0) in Q30 format.
pub const Q30_ONE: i32 = 0x4000_0000;

/// One (1.0) in Q29 format.
pub const Q29_ONE: i32 = 0x2000_0000;

/// Multiplies two Q31 values, yielding Q31.
#[inline(always)]
pub fn fxp_mul32_q31(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 31) as i32
}

/// Multiplies two values with 30 fractional bits between them removed, e.g. Q30 * Q30 -> Q30,
/// or Q31 * Q29 -> Q30.
#[inline(always)]
pub fn fxp_mul32_q30(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 30) as i32
}

/// Multiplies two values with 29 fractional bits between them removed.
#[inline(always)]
pub fn fxp_mul32_q29(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 29) as i32
}

/// Multiply-accumulate in Q31: `acc + (a * b >> 31)`, wrapping on overflow.
#[inline(always)]
pub fn fxp_mac32_q31(acc: i32, a: i32, b: i32) -> i32 {
    acc.wrapping_add(fxp_mul32_q31(a, b))
}

/// Multiply-subtract in Q31: `acc - (a * b >> 31)`, wrapping on overflow.
#[inline(always)]
pub fn fxp_msu32_q31(acc: i32, a: i32, b: i32) -> i32 {
    acc.wrapping_sub(fxp_mul32_q31(a, b))
}

/// Multiplies a 32-bit sample by a 16-bit Q13 coefficient, keeping the sample's Q format.
#[inline(always)]
pub fn fxp_mul32_by_16(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 13) as i32
}

/// Saturating addition for power accumulation points.
#[inline(always)]
pub fn fxp_add32_sat(a: i32, b: i32) -> i32 {
    a.saturating_add(b)
}

/// A complex fixed-point sample. Real and imaginary parts share one Q format from context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cplx {
    pub re: i32,
    pub im: i32,
}

impl Cplx {
    pub const ZERO: Cplx = Cplx { re: 0, im: 0 };

    #[inline(always)]
    pub fn new(re: i32, im: i32) -> Self {
        Cplx { re, im }
    }
}

/// Complex addition, wrapping per component.
#[inline(always)]
pub fn cplx_add(a: Cplx, b: Cplx) -> Cplx {
    Cplx { re: a.re.wrapping_add(b.re), im: a.im.wrapping_add(b.im) }
}

/// Complex subtraction, wrapping per component.
#[inline(always)]
pub fn cplx_sub(a: Cplx, b: Cplx) -> Cplx {
    Cplx { re: a.re.wrapping_sub(b.re), im: a.im.wrapping_sub(b.im) }
}

/// Complex multiply with a Q31 rotation factor: `a * b >> 31` per component.
#[inline(always)]
pub fn cplx_mul_q31(a: Cplx, b: Cplx) -> Cplx {
    Cplx {
        re: fxp_msu32_q31(fxp_mul32_q31(a.re, b.re), a.im, b.im),
        im: fxp_mac32_q31(fxp_mul32_q31(a.re, b.im), a.im, b.re),
    }
}

/// Scales a complex sample by a real Q31 factor.
#[inline(always)]
pub fn cplx_scale_q31(a: Cplx, s: i32) -> Cplx {
    Cplx { re: fxp_mul32_q31(a.re, s), im: fxp_mul32_q31(a.im, s) }
}

/// Converts a unit-range f64 constant to Q31 at table-initialisation time.
pub fn q31(x: f64) -> i32 {
    let v = (x * f64::from(Q31_ONE)).round();
    v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Converts an f64 constant with |x| < 2.0 to Q30 at table-initialisation time.
pub fn q30(x: f64) -> i32 {
    let v = (x * f64::from(Q30_ONE)).round();
    v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Converts an f64 constant with |x| < 4.0 to Q29 at table-initialisation time.
pub fn q29(x: f64) -> i32 {
    let v = (x * f64::from(Q29_ONE)).round();
    v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_mul_q31() {
        // 0.5 * 0.5 = 0.25
        assert_eq!(fxp_mul32_q31(0x4000_0000, 0x4000_0000), 0x2000_0000);
        // -0.5 * 0.5 = -0.25
        assert_eq!(fxp_mul32_q31(-0x4000_0000, 0x4000_0000), -0x2000_0000);
        // Truncation, not rounding: the smallest positive product truncates to zero.
        assert_eq!(fxp_mul32_q31(1, 1), 0);
        assert_eq!(fxp_mul32_q31(-1, 1), -1);
    }

    #[test]
    fn verify_mul_q30() {
        // 1.0 (Q30) * 1.0 (Q30) = 1.0 (Q30)
        assert_eq!(fxp_mul32_q30(Q30_ONE, Q30_ONE), Q30_ONE);
        assert_eq!(fxp_mul32_q29(Q29_ONE, Q29_ONE), Q29_ONE);
    }

    #[test]
    fn verify_cplx_mul() {
        // Rotation by -j: (re, im) -> (im, -re).
        let a = Cplx::new(0x1000_0000, 0x0200_0000);
        let minus_j = Cplx::new(0, -Q31_ONE);
        let r = cplx_mul_q31(a, minus_j);

        // Q31_ONE is 1.0 - 2^-31, so allow the one-lsb truncation error.
        assert!((r.re - a.im).abs() <= 1);
        assert!((r.im + a.re).abs() <= 1);
    }

    #[test]
    fn verify_q31_conversion() {
        assert_eq!(q31(0.0), 0);
        assert_eq!(q31(-1.0), -Q31_ONE);
        assert_eq!(q31(0.5), 0x4000_0000);
    }
}
