// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hybrid filterbank: splits the lowest QMF bands into higher-resolution sub-subbands.
//!
//! QMF band 0 passes through an 8-channel complex filter whose outputs are combined down to 6
//! channels; bands 1 and 2 each pass through a 2-channel real filter. The synthesis direction
//! is plain summation: the modulated channels of one band sum back to the input delayed by the
//! 6-slot filter group delay.

use lazy_static::lazy_static;

use crate::fixed::*;

/// Number of QMF bands routed through the filterbank.
pub const HYBRID_BANDS: usize = 3;

/// Total hybrid channels: 6 from band 0, 2 each from bands 1 and 2.
pub const HYBRID_CHANNELS: usize = 10;

/// Length of both prototype filters.
pub const HYBRID_FILTER_LEN: usize = 13;

/// Group delay of the filterbank in QMF slots. Bands that bypass the filterbank must be
/// delayed by the same amount to stay time aligned.
pub const HYBRID_FILTER_DELAY: usize = 6;

/// 13-tap prototype of the 8-channel complex filter.
const P8_13: [f64; 13] = [
    0.00746082949812,
    0.02270420949825,
    0.04546865930473,
    0.07266113929591,
    0.09885108575264,
    0.11793710567217,
    0.125,
    0.11793710567217,
    0.09885108575264,
    0.07266113929591,
    0.04546865930473,
    0.02270420949825,
    0.00746082949812,
];

/// Non-zero off-centre taps of the 2-channel symmetric filter (taps 1, 3, 5; the centre tap
/// is 0.5 and all even off-centre taps are zero).
const P2_13: [f64; 3] = [0.01899487526049, -0.07293139167538, 0.30596630545168];

lazy_static! {
    static ref P8_Q31: [i32; 13] = P8_13.map(q31);
    static ref P2_Q31: [i32; 3] = P2_13.map(q31);

    /// Pre-twiddle `exp(-j*pi*r/8)` applied to the mod-8 folded taps before the 8-point FFT,
    /// realising the half-channel shift of the 8-channel filter.
    static ref PRE_TWIDDLE: [Cplx; 8] = {
        let mut t = [Cplx::ZERO; 8];
        for (r, v) in t.iter_mut().enumerate() {
            let theta = -std::f64::consts::PI * (r as f64) / 8.0;
            *v = Cplx::new(q31(theta.cos()), q31(theta.sin()));
        }
        t
    };

    static ref SQRT1_2_Q31: i32 = q31(std::f64::consts::FRAC_1_SQRT_2);
}

/// State of the hybrid analysis: one 13-deep complex ring per processed QMF band.
pub struct Hybrid {
    ring: [[Cplx; HYBRID_FILTER_LEN]; HYBRID_BANDS],
    pos: usize,
}

impl Hybrid {
    pub fn new() -> Self {
        Hybrid { ring: [[Cplx::ZERO; HYBRID_FILTER_LEN]; HYBRID_BANDS], pos: 0 }
    }

    /// The sample `d` slots ago, `0 <= d < 13`.
    #[inline]
    fn tap(&self, band: usize, d: usize) -> Cplx {
        self.ring[band][(self.pos + HYBRID_FILTER_LEN - d) % HYBRID_FILTER_LEN]
    }

    /// Pushes one QMF slot of the three lowest bands and produces the 10 hybrid channels.
    ///
    /// Channel layout: 0..6 from QMF band 0 (FFT channels 6, 7, 0, 1, 2+5, 3+4), 6..8 from
    /// band 1 (difference first), 8..10 from band 2 (sum first).
    pub fn analyze(&mut self, qmf: &[Cplx; HYBRID_BANDS]) -> [Cplx; HYBRID_CHANNELS] {
        self.pos = (self.pos + 1) % HYBRID_FILTER_LEN;
        for (band, &sample) in qmf.iter().enumerate() {
            self.ring[band][self.pos] = sample;
        }

        let mut out = [Cplx::ZERO; HYBRID_CHANNELS];

        let f8 = self.filter8(0);
        out[0] = f8[6];
        out[1] = f8[7];
        out[2] = f8[0];
        out[3] = f8[1];
        out[4] = cplx_add(f8[2], f8[5]);
        out[5] = cplx_add(f8[3], f8[4]);

        let (sum, diff) = self.filter2(1);
        out[6] = diff;
        out[7] = sum;

        let (sum, diff) = self.filter2(2);
        out[8] = sum;
        out[9] = diff;

        out
    }

    /// 2-channel real filter: centre tap plus the symmetric fold of the odd taps, yielding
    /// the sum and difference channels.
    fn filter2(&self, band: usize) -> (Cplx, Cplx) {
        let centre = cplx_scale_q31(self.tap(band, 6), 1 << 30);

        let mut fold = Cplx::ZERO;
        for (i, &p) in P2_Q31.iter().enumerate() {
            let d = 2 * i + 1;
            let pair = cplx_add(self.tap(band, d), self.tap(band, 12 - d));
            fold = cplx_add(fold, cplx_scale_q31(pair, p));
        }

        (cplx_add(centre, fold), cplx_sub(centre, fold))
    }

    /// 8-channel complex filter: the 13 weighted taps are folded mod 8, pre-twiddled for the
    /// half-channel shift, and transformed by a hard-coded 8-point FFT.
    fn filter8(&self, band: usize) -> [Cplx; 8] {
        let p = &*P8_Q31;

        // Folded taps u[r]: tap index n maps to r = (n - 6) mod 8, with the wrapped taps
        // (n < 6) entering negated by the half-channel shift.
        let x = |d: usize| self.tap(band, d);
        let u = [
            cplx_scale_q31(x(6), p[6]),
            cplx_scale_q31(x(5), p[7]),
            cplx_sub(cplx_scale_q31(x(4), p[8]), cplx_scale_q31(x(12), p[0])),
            cplx_sub(cplx_scale_q31(x(3), p[9]), cplx_scale_q31(x(11), p[1])),
            cplx_sub(cplx_scale_q31(x(2), p[10]), cplx_scale_q31(x(10), p[2])),
            cplx_sub(cplx_scale_q31(x(1), p[11]), cplx_scale_q31(x(9), p[3])),
            cplx_sub(cplx_scale_q31(x(0), p[12]), cplx_scale_q31(x(8), p[4])),
            cplx_scale_q31(Cplx::new(-x(7).re, -x(7).im), p[5]),
        ];

        let mut w = [Cplx::ZERO; 8];
        for (r, &v) in u.iter().enumerate() {
            w[r] = cplx_mul_q31(v, PRE_TWIDDLE[r]);
        }

        fft8(&w)
    }

    /// Synthesis: the adjoint summation back to the three lowest QMF bands.
    pub fn synthesize(hybrid: &[Cplx; HYBRID_CHANNELS]) -> [Cplx; HYBRID_BANDS] {
        let mut band0 = Cplx::ZERO;
        for &ch in &hybrid[..6] {
            band0 = cplx_add(band0, ch);
        }

        [band0, cplx_add(hybrid[6], hybrid[7]), cplx_add(hybrid[8], hybrid[9])]
    }
}

impl Default for Hybrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Hard-coded 8-point FFT with the `exp(-j*2*pi*q*r/8)` kernel, radix-2
/// decimation-in-time.
fn fft8(w: &[Cplx; 8]) -> [Cplx; 8] {
    let c = *SQRT1_2_Q31;

    let e = dft4([w[0], w[2], w[4], w[6]]);
    let o = dft4([w[1], w[3], w[5], w[7]]);

    // Twiddled odd terms: t_q = exp(-j*2*pi*q/8) * o_q.
    let t = [
        o[0],
        Cplx::new(
            fxp_mul32_q31(o[1].re.wrapping_add(o[1].im), c),
            fxp_mul32_q31(o[1].im.wrapping_sub(o[1].re), c),
        ),
        Cplx::new(o[2].im, -o[2].re),
        Cplx::new(
            fxp_mul32_q31(o[3].im.wrapping_sub(o[3].re), c),
            fxp_mul32_q31((-o[3].re).wrapping_sub(o[3].im), c),
        ),
    ];

    let mut y = [Cplx::ZERO; 8];
    for q in 0..4 {
        y[q] = cplx_add(e[q], t[q]);
        y[q + 4] = cplx_sub(e[q], t[q]);
    }
    y
}

/// 4-point FFT, negative-exponent kernel.
fn dft4(z: [Cplx; 4]) -> [Cplx; 4] {
    let a0 = cplx_add(z[0], z[2]);
    let a1 = cplx_sub(z[0], z[2]);
    let b0 = cplx_add(z[1], z[3]);
    let b1 = cplx_sub(z[1], z[3]);

    [
        cplx_add(a0, b0),
        // a1 - j*b1 and a1 + j*b1.
        cplx_add(a1, Cplx::new(b1.im, -b1.re)),
        cplx_sub(a0, b0),
        cplx_add(a1, Cplx::new(-b1.im, b1.re)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct f64 evaluation of the 8-channel filter over the last 13 inputs.
    fn reference_filter8(inputs: &[(f64, f64)], q: usize) -> (f64, f64) {
        let mut re = 0.0;
        let mut im = 0.0;
        for (n, &p) in P8_13.iter().enumerate() {
            let (xr, xi) = inputs[inputs.len() - 1 - (12 - n)];
            let theta =
                -2.0 * std::f64::consts::PI * (q as f64 + 0.5) * (n as f64 - 6.0) / 8.0;
            let (s, c) = theta.sin_cos();
            re += p * (xr * c - xi * s);
            im += p * (xr * s + xi * c);
        }
        (re, im)
    }

    #[test]
    fn verify_filter8_matches_direct_modulation() {
        let mut hybrid = Hybrid::new();
        let mut inputs = Vec::new();

        let mut out = [Cplx::ZERO; HYBRID_CHANNELS];
        for t in 0i64..16 {
            // A deterministic, sign-varying drive signal.
            let re = ((t * t * 119 + 31 * t) % 4021 - 2010) << 16;
            let im = ((t * 57 + 1111) % 3001 - 1500) << 16;
            let sample = Cplx::new(re as i32, im as i32);
            inputs.push((f64::from(sample.re), f64::from(sample.im)));

            out = hybrid.analyze(&[sample, Cplx::ZERO, Cplx::ZERO]);
        }

        // Channels 0..4 are raw FFT channels 6, 7, 0, 1.
        for (ch, q) in [(0usize, 6usize), (1, 7), (2, 0), (3, 1)] {
            let (re, im) = reference_filter8(&inputs, q);
            assert!(
                (f64::from(out[ch].re) - re).abs() < 512.0,
                "ch {} re: {} vs {}",
                ch,
                out[ch].re,
                re
            );
            assert!((f64::from(out[ch].im) - im).abs() < 512.0);
        }
    }

    #[test]
    fn verify_synthesis_reconstructs_delayed_input() {
        let mut hybrid = Hybrid::new();

        let mut history = Vec::new();
        for t in 0i64..32 {
            let sample = Cplx::new(
                (((t * 77) % 255 - 127) << 20) as i32,
                (((t * 33 + 5) % 255 - 127) << 20) as i32,
            );
            let b1 = Cplx::new((((t * 13) % 101 - 50) << 20) as i32, 0);
            history.push((sample, b1));

            let channels = hybrid.analyze(&[sample, b1, b1]);
            let bands = Hybrid::synthesize(&channels);

            if t >= 13 {
                let (expect0, expect1) = history[(t - HYBRID_FILTER_DELAY as i64) as usize];
                // Summation cancels the modulation exactly; only truncation noise remains.
                assert!((bands[0].re - expect0.re).abs() < 1024);
                assert!((bands[0].im - expect0.im).abs() < 1024);
                assert!((bands[1].re - expect1.re).abs() < 1024);
                assert!((bands[2].re - expect1.re).abs() < 1024);
            }
        }
    }
}
