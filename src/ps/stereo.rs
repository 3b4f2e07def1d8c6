// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-varying 2x2 stereo mixing: combines the direct (mono) and decorrelated signals into
//! left and right per frequency group, with the mixing matrix linearly interpolated across
//! each envelope.

use lazy_static::lazy_static;

use crate::fixed::*;
use crate::ps::bs::PsParams;
use crate::ps::hybrid::HYBRID_CHANNELS;
use crate::ps::{group_bin, NO_QMF_BANDS, NO_STEREO_GROUPS, QMF_GROUP_BORDERS, QMF_START_BAND};

/// IID quantisation steps in dB, default (7-step) resolution, indexed by `iid_index + 7`.
#[rustfmt::skip]
const IID_DEFAULT_DB: [f64; 15] = [
    -25.0, -18.0, -14.0, -10.0, -7.0, -4.0, -2.0, 0.0,
    2.0, 4.0, 7.0, 10.0, 14.0, 18.0, 25.0,
];

/// IID quantisation steps in dB, fine (15-step) resolution, indexed by `iid_index + 15`.
#[rustfmt::skip]
const IID_FINE_DB: [f64; 31] = [
    -50.0, -45.0, -40.0, -35.0, -30.0, -25.0, -22.0, -19.0, -16.0, -13.0,
    -10.0, -8.0, -6.0, -4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0,
    10.0, 13.0, 16.0, 19.0, 22.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0,
];

/// ICC quantisation steps as correlation coefficients.
const ICC_RHO: [f64; 8] = [1.0, 0.937, 0.84118, 0.60092, 0.36764, 0.0, -0.589, -1.0];

/// Derives one [h11, h12, h21, h22] target in Q29 from a dequantised IID/ICC pair.
fn mixing_target(iid_db: f64, rho: f64) -> [i32; 4] {
    let c = 10f64.powf(iid_db / 20.0);
    let c1 = std::f64::consts::SQRT_2 / (1.0 + c * c).sqrt();
    let c2 = c * c1;

    let alpha = 0.5 * rho.clamp(-1.0, 1.0).acos();
    let beta = alpha * (c1 - c2) * std::f64::consts::FRAC_1_SQRT_2;

    [
        q29(c2 * (beta + alpha).cos()),
        q29(c1 * (beta - alpha).cos()),
        q29(c2 * (beta + alpha).sin()),
        q29(c1 * (beta - alpha).sin()),
    ]
}

lazy_static! {
    /// Mixing targets for the default IID quantisation, `[iid + 7][icc]`.
    static ref H_DEFAULT: [[[i32; 4]; 8]; 15] = {
        let mut t = [[[0; 4]; 8]; 15];
        for (i, row) in t.iter_mut().enumerate() {
            for (j, h) in row.iter_mut().enumerate() {
                *h = mixing_target(IID_DEFAULT_DB[i], ICC_RHO[j]);
            }
        }
        t
    };

    /// Mixing targets for the fine IID quantisation, `[iid + 15][icc]`.
    static ref H_FINE: [[[i32; 4]; 8]; 31] = {
        let mut t = [[[0; 4]; 8]; 31];
        for (i, row) in t.iter_mut().enumerate() {
            for (j, h) in row.iter_mut().enumerate() {
                *h = mixing_target(IID_FINE_DB[i], ICC_RHO[j]);
            }
        }
        t
    };
}

/// Per-group mixing state: Q29 coefficient accumulators and the per-slot deltas of the
/// current envelope. The effective coefficient for a slot is the accumulator's top 16 bits
/// (Q13), taken after the delta is added.
pub struct Stereo {
    h: [[i32; 4]; NO_STEREO_GROUPS],
    delta: [[i32; 4]; NO_STEREO_GROUPS],
}

impl Stereo {
    /// Starts from the identity mix, so a stream whose first frame carries zero indices is
    /// reconstructed exactly from the first slot.
    pub fn new() -> Self {
        Stereo {
            h: [[Q29_ONE, Q29_ONE, 0, 0]; NO_STEREO_GROUPS],
            delta: [[0; 4]; NO_STEREO_GROUPS],
        }
    }

    /// Computes the per-slot deltas that carry each group's coefficients from their current
    /// values to the envelope's targets over `len` slots.
    pub fn start_envelope(&mut self, params: &PsParams, env: usize, len: i32) {
        let iid_offset = if params.fine_iid { 15 } else { 7 };

        for g in 0..NO_STEREO_GROUPS {
            let bin = group_bin(g);
            let iid = (params.iid_index[env][bin] + iid_offset) as usize;
            let icc = params.icc_index[env][bin] as usize;

            let target =
                if params.fine_iid { &H_FINE[iid][icc] } else { &H_DEFAULT[iid][icc] };

            for (c, &t) in target.iter().enumerate() {
                if len > 0 {
                    self.delta[g][c] = (t - self.h[g][c]) / len;
                }
                else {
                    self.h[g][c] = t;
                    self.delta[g][c] = 0;
                }
            }
        }
    }

    /// Mixes one slot in place: on return the `s` arrays hold the left channel and the `d`
    /// arrays the right channel.
    pub fn mix(
        &mut self,
        hybrid_s: &mut [Cplx; HYBRID_CHANNELS],
        hybrid_d: &mut [Cplx; HYBRID_CHANNELS],
        qmf_s: &mut [Cplx; NO_QMF_BANDS],
        qmf_d: &mut [Cplx; NO_QMF_BANDS],
    ) {
        for g in 0..NO_STEREO_GROUPS {
            for c in 0..4 {
                self.h[g][c] = self.h[g][c].wrapping_add(self.delta[g][c]);
            }

            let h11 = self.h[g][0] >> 16;
            let h12 = self.h[g][1] >> 16;
            let h21 = self.h[g][2] >> 16;
            let h22 = self.h[g][3] >> 16;

            if g < HYBRID_CHANNELS {
                let (l, r) = mix_sample(hybrid_s[g], hybrid_d[g], h11, h12, h21, h22);
                hybrid_s[g] = l;
                hybrid_d[g] = r;
            }
            else {
                let lo = QMF_GROUP_BORDERS[g - HYBRID_CHANNELS] - QMF_START_BAND;
                let hi = QMF_GROUP_BORDERS[g - HYBRID_CHANNELS + 1] - QMF_START_BAND;
                for band in lo..hi {
                    let (l, r) = mix_sample(qmf_s[band], qmf_d[band], h11, h12, h21, h22);
                    qmf_s[band] = l;
                    qmf_d[band] = r;
                }
            }
        }
    }
}

impl Default for Stereo {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn mix_sample(s: Cplx, d: Cplx, h11: i32, h12: i32, h21: i32, h22: i32) -> (Cplx, Cplx) {
    let l = Cplx {
        re: fxp_mul32_by_16(s.re, h11).wrapping_add(fxp_mul32_by_16(d.re, h21)),
        im: fxp_mul32_by_16(s.im, h11).wrapping_add(fxp_mul32_by_16(d.im, h21)),
    };
    let r = Cplx {
        re: fxp_mul32_by_16(s.re, h12).wrapping_add(fxp_mul32_by_16(d.re, h22)),
        im: fxp_mul32_by_16(s.im, h12).wrapping_add(fxp_mul32_by_16(d.im, h22)),
    };
    (l, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_mixing_targets() {
        // 0 dB IID with full correlation is the identity mix.
        assert_eq!(H_DEFAULT[7][0], [Q29_ONE, Q29_ONE, 0, 0]);
        assert_eq!(H_FINE[15][0], [Q29_ONE, Q29_ONE, 0, 0]);

        // 0 dB with zero correlation rotates the channels 45 degrees apart: alpha is pi/4,
        // beta is zero, so h11, h12, and h21 land on cos(pi/4) and h22 on sin(-pi/4).
        let c = q29(std::f64::consts::FRAC_1_SQRT_2);
        let h = &H_DEFAULT[7][5];
        for &v in &h[..3] {
            assert!((v - c).abs() <= 2, "{} vs {}", v, c);
        }
        assert!((h[3] + c).abs() <= 2, "{} vs {}", h[3], -c);
    }

    #[test]
    fn verify_identity_mix_is_exact() {
        let mut stereo = Stereo::new();
        let params = PsParams::new();
        stereo.start_envelope(&params, 0, 32);

        let mut hybrid_s = [Cplx::new(123_456, -77), Cplx::ZERO, Cplx::new(-1, 1 << 20),
            Cplx::ZERO, Cplx::ZERO, Cplx::ZERO, Cplx::ZERO, Cplx::ZERO, Cplx::ZERO,
            Cplx::new(42, 42)];
        let mut hybrid_d = [Cplx::new(9_999, 1); HYBRID_CHANNELS];
        let mut qmf_s = [Cplx::new(-(1 << 22), 3); NO_QMF_BANDS];
        let mut qmf_d = [Cplx::new(55, -55); NO_QMF_BANDS];

        let expect_hybrid = hybrid_s;
        let expect_qmf = qmf_s;

        stereo.mix(&mut hybrid_s, &mut hybrid_d, &mut qmf_s, &mut qmf_d);

        // With zero IID/ICC indices the effective coefficients are exactly (1, 1, 0, 0) in
        // Q13, so both outputs reproduce the direct signal bit for bit.
        assert_eq!(hybrid_s, expect_hybrid);
        assert_eq!(hybrid_d, expect_hybrid);
        assert_eq!(qmf_s, expect_qmf);
        assert_eq!(qmf_d, expect_qmf);
    }

    #[test]
    fn verify_linear_interpolation() {
        let mut stereo = Stereo::new();

        let mut params = PsParams::new();
        params.enable_iid = true;
        params.enable_icc = true;
        for bin in 0..34 {
            params.iid_index[0][bin] = 4;
            params.icc_index[0][bin] = 3;
        }

        let len = 5;
        stereo.start_envelope(&params, 0, len);

        let initial = stereo.h;
        let delta = stereo.delta;

        let mut hybrid_s = [Cplx::ZERO; HYBRID_CHANNELS];
        let mut hybrid_d = [Cplx::ZERO; HYBRID_CHANNELS];
        let mut qmf_s = [Cplx::ZERO; NO_QMF_BANDS];
        let mut qmf_d = [Cplx::ZERO; NO_QMF_BANDS];
        for _ in 0..len {
            stereo.mix(&mut hybrid_s, &mut hybrid_d, &mut qmf_s, &mut qmf_d);
        }

        for g in 0..NO_STEREO_GROUPS {
            let target = &H_DEFAULT[4 + 7][3];
            for c in 0..4 {
                // After `len` slots the accumulator sits at initial + len * delta, within
                // one truncated division step of the envelope target.
                assert_eq!(stereo.h[g][c], initial[g][c] + len * delta[g][c]);
                assert!((stereo.h[g][c] - target[c]).abs() < len);
            }
        }
    }
}
