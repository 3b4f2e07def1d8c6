// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! All-pass decorrelation: synthesizes the "right-like" signal from the mono hybrid/QMF
//! signal, with transient attenuation from a per-bin power detector.

use lazy_static::lazy_static;

use crate::fixed::*;
use crate::ps::hybrid::HYBRID_CHANNELS;
use crate::ps::{K_TO_BIN, NO_BINS, NO_QMF_BANDS, QMF_START_BAND};

/// Bands passed through the all-pass cascade: the 10 hybrid channels plus QMF bands 3..23.
pub const NR_ALLPASS_BANDS: usize = 30;

const NO_ALLPASS_LINKS: usize = 3;

/// Ring depths of the three serial all-pass links.
const LINK_DELAYS: [usize; NO_ALLPASS_LINKS] = [3, 4, 5];

/// First QMF band receiving the 14-slot pure delay, and the band where it drops to 1 slot.
const LONG_DELAY_START: usize = 23;
const SHORT_DELAY_START: usize = 35;
const LONG_DELAY: usize = 14;
const NO_LONG_DELAY_BANDS: usize = SHORT_DELAY_START - LONG_DELAY_START;
const NO_SHORT_DELAY_BANDS: usize = 64 - SHORT_DELAY_START;

const PEAK_DECAY_FACTOR: f64 = 0.765928338364649;
const DECAY_CUTOFF: usize = 10;
const DECAY_SLOPE: f64 = 0.05;

/// Per-link all-pass gains.
const FILTER_GAINS: [f64; NO_ALLPASS_LINKS] =
    [0.65143905753106, 0.56471812200776, 0.48954165955695];

/// Per-link fractional delay lengths, and the one of the pre-rotation.
const FRACT_DELAYS: [f64; NO_ALLPASS_LINKS] = [0.43, 0.75, 0.347];
const FRACT_DELAY_PHI: f64 = 0.39;

/// Centre frequencies of the 10 hybrid channels, in eighths of a QMF band.
#[rustfmt::skip]
const F_CENTER_20: [f64; 10] = [
    -3.0 / 8.0, -1.0 / 8.0, 1.0 / 8.0, 3.0 / 8.0, 5.0 / 8.0,
    7.0 / 8.0, 5.0 / 4.0, 7.0 / 4.0, 9.0 / 4.0, 11.0 / 4.0,
];

fn f_center(k: usize) -> f64 {
    if k < F_CENTER_20.len() {
        F_CENTER_20[k] * 0.125
    }
    else {
        (k as f64 - 6.5) * 0.125
    }
}

lazy_static! {
    /// Fractional-delay pre-rotation per all-pass band.
    static ref PHI_FRACT: [Cplx; NR_ALLPASS_BANDS] = {
        let mut t = [Cplx::ZERO; NR_ALLPASS_BANDS];
        for (k, v) in t.iter_mut().enumerate() {
            let theta = -std::f64::consts::PI * FRACT_DELAY_PHI * f_center(k);
            *v = Cplx::new(q31(theta.cos()), q31(theta.sin()));
        }
        t
    };

    /// Fractional-delay rotation per all-pass band and link.
    static ref Q_FRACT: [[Cplx; NO_ALLPASS_LINKS]; NR_ALLPASS_BANDS] = {
        let mut t = [[Cplx::ZERO; NO_ALLPASS_LINKS]; NR_ALLPASS_BANDS];
        for (k, row) in t.iter_mut().enumerate() {
            for (m, v) in row.iter_mut().enumerate() {
                let theta = -std::f64::consts::PI * FRACT_DELAYS[m] * f_center(k);
                *v = Cplx::new(q31(theta.cos()), q31(theta.sin()));
            }
        }
        t
    };

    /// Decay-slope scale of the link gains: unity below the cutoff, sloping to zero above.
    static ref DECAY_SCALE: [i32; NR_ALLPASS_BANDS] = {
        let mut t = [0; NR_ALLPASS_BANDS];
        for (k, v) in t.iter_mut().enumerate() {
            let s = 1.0 - DECAY_SLOPE * (k as f64 - DECAY_CUTOFF as f64);
            *v = q31(s.clamp(0.0, 1.0));
        }
        t
    };

    static ref FILTER_GAINS_Q31: [i32; NO_ALLPASS_LINKS] = FILTER_GAINS.map(q31);
    static ref PEAK_DECAY_Q31: i32 = q31(PEAK_DECAY_FACTOR);
}

/// Attenuation applied to the decorrelated signal during transients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransientRatio {
    NoAttenuation,
    /// Attenuation factor in Q31, always below 1.0.
    Scale(i32),
}

impl TransientRatio {
    #[inline]
    pub fn apply(self, v: Cplx) -> Cplx {
        match self {
            TransientRatio::NoAttenuation => v,
            TransientRatio::Scale(s) => cplx_scale_q31(v, s),
        }
    }
}

/// Decorrelator state: the 2-slot main delay and three serial all-pass rings per band, the
/// pure-delay lines of the upper bands, and the per-bin transient-detector history.
///
/// Each rotating index steps by exactly one, modulo its ring depth, once per slot after all
/// bands are processed; the serial rings desynchronize permanently if this drifts.
pub struct Decorrelator {
    delay: [[Cplx; 2]; NR_ALLPASS_BANDS],
    delay_idx: usize,
    ser0: [[Cplx; 3]; NR_ALLPASS_BANDS],
    ser1: [[Cplx; 4]; NR_ALLPASS_BANDS],
    ser2: [[Cplx; 5]; NR_ALLPASS_BANDS],
    ser_idx: [usize; NO_ALLPASS_LINKS],
    long_delay: [[Cplx; LONG_DELAY]; NO_LONG_DELAY_BANDS],
    long_idx: usize,
    short_delay: [Cplx; NO_SHORT_DELAY_BANDS],
    peak_decay_nrg: [i32; NO_BINS],
    power_smooth: [i32; NO_BINS],
    peak_diff_smooth: [i32; NO_BINS],
}

impl Decorrelator {
    pub fn new() -> Self {
        Decorrelator {
            delay: [[Cplx::ZERO; 2]; NR_ALLPASS_BANDS],
            delay_idx: 0,
            ser0: [[Cplx::ZERO; 3]; NR_ALLPASS_BANDS],
            ser1: [[Cplx::ZERO; 4]; NR_ALLPASS_BANDS],
            ser2: [[Cplx::ZERO; 5]; NR_ALLPASS_BANDS],
            ser_idx: [0; NO_ALLPASS_LINKS],
            long_delay: [[Cplx::ZERO; LONG_DELAY]; NO_LONG_DELAY_BANDS],
            long_idx: 0,
            short_delay: [Cplx::ZERO; NO_SHORT_DELAY_BANDS],
            peak_decay_nrg: [0; NO_BINS],
            power_smooth: [0; NO_BINS],
            peak_diff_smooth: [0; NO_BINS],
        }
    }

    /// Processes one slot of the stacked hybrid + QMF signal into its decorrelated
    /// counterpart.
    pub fn decorrelate(
        &mut self,
        hybrid: &[Cplx; HYBRID_CHANNELS],
        qmf: &[Cplx; NO_QMF_BANDS],
    ) -> ([Cplx; HYBRID_CHANNELS], [Cplx; NO_QMF_BANDS]) {
        let gains = self.update_transient(hybrid, qmf);

        let mut out_hybrid = [Cplx::ZERO; HYBRID_CHANNELS];
        let mut out_qmf = [Cplx::ZERO; NO_QMF_BANDS];

        for k in 0..NR_ALLPASS_BANDS {
            let v = if k < HYBRID_CHANNELS { hybrid[k] } else { qmf[k - HYBRID_CHANNELS] };

            // 2-slot main delay, read before overwrite.
            let delayed = self.delay[k][self.delay_idx];
            self.delay[k][self.delay_idx] = v;

            let mut t = cplx_mul_q31(delayed, PHI_FRACT[k]);

            let scale = DECAY_SCALE[k];
            let g0 = fxp_mul32_q31(FILTER_GAINS_Q31[0], scale);
            let g1 = fxp_mul32_q31(FILTER_GAINS_Q31[1], scale);
            let g2 = fxp_mul32_q31(FILTER_GAINS_Q31[2], scale);

            t = allpass_link(&mut self.ser0[k], self.ser_idx[0], Q_FRACT[k][0], g0, t);
            t = allpass_link(&mut self.ser1[k], self.ser_idx[1], Q_FRACT[k][1], g1, t);
            t = allpass_link(&mut self.ser2[k], self.ser_idx[2], Q_FRACT[k][2], g2, t);

            let scaled = gains[K_TO_BIN[k]].apply(t);
            if k < HYBRID_CHANNELS {
                out_hybrid[k] = scaled;
            }
            else {
                out_qmf[k - HYBRID_CHANNELS] = scaled;
            }
        }

        // Upper bands get a pure delay, still transient-scaled.
        for (j, ring) in self.long_delay.iter_mut().enumerate() {
            let idx = LONG_DELAY_START - QMF_START_BAND + j;
            let delayed = ring[self.long_idx];
            ring[self.long_idx] = qmf[idx];
            out_qmf[idx] = gains[K_TO_BIN[HYBRID_CHANNELS + idx]].apply(delayed);
        }

        for (j, slot) in self.short_delay.iter_mut().enumerate() {
            let idx = SHORT_DELAY_START - QMF_START_BAND + j;
            let delayed = *slot;
            *slot = qmf[idx];
            out_qmf[idx] = gains[K_TO_BIN[HYBRID_CHANNELS + idx]].apply(delayed);
        }

        // Advance every rotating index exactly once per slot, after all bands.
        self.delay_idx = (self.delay_idx + 1) % 2;
        for (m, idx) in self.ser_idx.iter_mut().enumerate() {
            *idx = (*idx + 1) % LINK_DELAYS[m];
        }
        self.long_idx = (self.long_idx + 1) % LONG_DELAY;

        (out_hybrid, out_qmf)
    }

    /// Updates the per-bin power history and derives this slot's transient attenuation.
    ///
    /// The peak tracker decays geometrically and latches onto power maxima; the smoothed
    /// peak-to-power difference, weighted by 1.5, exceeding the smoothed energy marks a
    /// transient, attenuated by `energy / (1.5 * peak_difference)`.
    fn update_transient(
        &mut self,
        hybrid: &[Cplx; HYBRID_CHANNELS],
        qmf: &[Cplx; NO_QMF_BANDS],
    ) -> [TransientRatio; NO_BINS] {
        let mut power = [0i32; NO_BINS];

        for (k, &bin) in K_TO_BIN.iter().enumerate() {
            let s = if k < HYBRID_CHANNELS { hybrid[k] } else { qmf[k - HYBRID_CHANNELS] };
            let sq = ((i64::from(s.re) * i64::from(s.re)) >> 31)
                + ((i64::from(s.im) * i64::from(s.im)) >> 31);
            power[bin] = fxp_add32_sat(power[bin], sq.min(i64::from(i32::MAX)) as i32);
        }

        let mut gains = [TransientRatio::NoAttenuation; NO_BINS];

        for bin in 0..NO_BINS {
            let decayed = fxp_mul32_q31(self.peak_decay_nrg[bin], *PEAK_DECAY_Q31);
            self.peak_decay_nrg[bin] = decayed.max(power[bin]);

            self.power_smooth[bin] += (power[bin] - self.power_smooth[bin]) >> 2;

            let peak_diff = self.peak_decay_nrg[bin] - power[bin];
            self.peak_diff_smooth[bin] += (peak_diff - self.peak_diff_smooth[bin]) >> 2;

            let denom = self.peak_diff_smooth[bin] + (self.peak_diff_smooth[bin] >> 1);
            if denom > self.power_smooth[bin] {
                let ratio = (i64::from(self.power_smooth[bin]) << 31) / i64::from(denom);
                gains[bin] = TransientRatio::Scale(ratio as i32);
            }
        }

        gains
    }
}

impl Default for Decorrelator {
    fn default() -> Self {
        Self::new()
    }
}

/// One serial all-pass link with a complex fractional-delay rotation:
/// `out = q * z_delayed - g * in`, re-feeding `in + g * out` into the ring.
#[inline]
fn allpass_link<const N: usize>(
    ring: &mut [Cplx; N],
    idx: usize,
    q: Cplx,
    g: i32,
    input: Cplx,
) -> Cplx {
    let w = cplx_mul_q31(ring[idx], q);
    let out = Cplx {
        re: fxp_msu32_q31(w.re, g, input.re),
        im: fxp_msu32_q31(w.im, g, input.im),
    };
    ring[idx] = Cplx {
        re: fxp_mac32_q31(input.re, g, out.re),
        im: fxp_mac32_q31(input.im, g, out.im),
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_rotating_indices() {
        let mut dec = Decorrelator::new();
        let hybrid = [Cplx::ZERO; HYBRID_CHANNELS];
        let qmf = [Cplx::ZERO; NO_QMF_BANDS];

        for n in 1..=23usize {
            dec.decorrelate(&hybrid, &qmf);

            assert_eq!(dec.delay_idx, n % 2);
            assert_eq!(dec.ser_idx, [n % 3, n % 4, n % 5]);
            assert_eq!(dec.long_idx, n % 14);
        }
    }

    #[test]
    fn verify_pure_delay_bands() {
        let mut dec = Decorrelator::new();
        let hybrid = [Cplx::ZERO; HYBRID_CHANNELS];

        // Constant drive in a 1-slot band (43) and a 14-slot band (23). Constant input never
        // trips the transient detector, so the outputs are unscaled delayed copies.
        let mut qmf = [Cplx::ZERO; NO_QMF_BANDS];
        let c = Cplx::new(1 << 20, -(1 << 19));
        qmf[43 - QMF_START_BAND] = c;
        qmf[23 - QMF_START_BAND] = c;

        for n in 0..20 {
            let (_, out) = dec.decorrelate(&hybrid, &qmf);

            if n >= 1 {
                assert_eq!(out[43 - QMF_START_BAND], c);
            }
            else {
                assert_eq!(out[43 - QMF_START_BAND], Cplx::ZERO);
            }

            if n >= 14 {
                assert_eq!(out[23 - QMF_START_BAND], c);
            }
            else {
                assert_eq!(out[23 - QMF_START_BAND], Cplx::ZERO);
            }
        }
    }

    #[test]
    fn verify_transient_detection() {
        let mut dec = Decorrelator::new();
        let mut hybrid = [Cplx::ZERO; HYBRID_CHANNELS];
        let qmf = [Cplx::ZERO; NO_QMF_BANDS];

        // Hybrid channel 0 maps to bin 1. A burst followed by silence must attenuate that
        // bin on the slot after the peak.
        hybrid[0] = Cplx::new(1 << 28, 0);
        let gains = dec.update_transient(&hybrid, &qmf);
        assert_eq!(gains[1], TransientRatio::NoAttenuation);

        hybrid[0] = Cplx::ZERO;
        let gains = dec.update_transient(&hybrid, &qmf);
        match gains[1] {
            TransientRatio::Scale(s) => {
                // power_smooth = 3P/16, peak diff * 1.5 ~ 0.287 P: ratio ~ 0.65.
                assert!(s > q31(0.6) && s < q31(0.7), "ratio {}", s);
            }
            TransientRatio::NoAttenuation => panic!("expected attenuation"),
        }

        // Untouched bins stay unattenuated.
        assert_eq!(gains[0], TransientRatio::NoAttenuation);
    }
}
