// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric Stereo reconstruction.
//!
//! The mono QMF-domain signal is split into a stacked parameter domain of 10 hybrid
//! sub-channels (from QMF bands 0..3) plus QMF bands 3..64, decorrelated into a synthetic
//! side signal, and mixed into left/right by the time-varying 2x2 matrix the bitstream
//! parameters describe.

use crate::fixed::Cplx;

pub mod bs;
pub mod codebooks;
pub mod decorrelate;
pub mod hybrid;
pub mod stereo;

use bs::{PsParams, NO_HI_RES_BINS};
use decorrelate::Decorrelator;
use hybrid::{Hybrid, HYBRID_BANDS, HYBRID_CHANNELS, HYBRID_FILTER_DELAY};
use stereo::Stereo;

/// QMF time slots per PS frame.
pub const QMF_SLOTS: usize = 32;

/// QMF bands per time slot.
pub const QMF_BANDS: usize = 64;

/// First QMF band processed outside the hybrid filterbank.
pub(crate) const QMF_START_BAND: usize = HYBRID_BANDS;

/// QMF bands in the stacked parameter domain (bands 3..64).
pub(crate) const NO_QMF_BANDS: usize = QMF_BANDS - QMF_START_BAND;

/// Parameter bins of the 20-bin grid all decoded index arrays are resolved to.
pub(crate) const NO_BINS: usize = 20;

/// Stereo-mixing groups: one per hybrid channel plus 12 QMF band ranges.
pub(crate) const NO_STEREO_GROUPS: usize = HYBRID_CHANNELS + 12;

/// QMF band borders of the 12 QMF groups. Band 3 forms its own single-band group.
pub(crate) const QMF_GROUP_BORDERS: [usize; 13] = [3, 4, 5, 6, 7, 8, 9, 11, 14, 18, 23, 35, 64];

/// Parameter bin of each stacked band. The first two hybrid sub-channels of QMF band 0 sit
/// above the next two in frequency, hence the swap around bins 0 and 1.
#[rustfmt::skip]
pub(crate) const K_TO_BIN: [usize; HYBRID_CHANNELS + NO_QMF_BANDS] = [
    1, 0, 0, 1, 2, 3, 4, 5, 6, 7,
    8, 9, 10, 11, 12, 13, 14, 14, 15, 15, 15, 16, 16, 16, 16, 17, 17, 17, 17, 17,
    18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
];

/// Parameter bin of a stereo-mixing group. QMF groups span bands that all share one bin.
pub(crate) fn group_bin(group: usize) -> usize {
    if group < HYBRID_CHANNELS {
        K_TO_BIN[group]
    }
    else {
        K_TO_BIN[HYBRID_CHANNELS + QMF_GROUP_BORDERS[group - HYBRID_CHANNELS] - QMF_START_BAND]
    }
}

/// Parametric Stereo decoder: bitstream parameters plus the filterbank, decorrelator, and
/// mixing state. All buffers are owned and sized at construction.
pub struct PsDecoder {
    pub params: PsParams,
    hybrid: Hybrid,
    decorrelator: Decorrelator,
    stereo: Stereo,
    /// Delay aligning the unfiltered QMF bands with the hybrid filterbank group delay.
    qmf_delay: [[Cplx; HYBRID_FILTER_DELAY]; NO_QMF_BANDS],
    qmf_delay_idx: usize,
}

impl PsDecoder {
    pub fn new() -> Self {
        PsDecoder {
            params: PsParams::new(),
            hybrid: Hybrid::new(),
            decorrelator: Decorrelator::new(),
            stereo: Stereo::new(),
            qmf_delay: [[Cplx::ZERO; HYBRID_FILTER_DELAY]; NO_QMF_BANDS],
            qmf_delay_idx: 0,
        }
    }

    /// Drops all signal history and decoded parameters, keeping the header configuration.
    pub fn reset(&mut self) {
        self.params.num_env = 0;
        self.params.data_available = false;
        self.params.iid_index_prev = [0; NO_HI_RES_BINS];
        self.params.icc_index_prev = [0; NO_HI_RES_BINS];
        self.hybrid = Hybrid::new();
        self.decorrelator = Decorrelator::new();
        self.stereo = Stereo::new();
        self.qmf_delay = [[Cplx::ZERO; HYBRID_FILTER_DELAY]; NO_QMF_BANDS];
        self.qmf_delay_idx = 0;
    }

    /// Reconstructs one frame of stereo QMF samples from the mono signal in `left`.
    ///
    /// `left` carries the 32 QMF slots of the mono downmix on entry and the left channel on
    /// return; `right` is fully overwritten. Parameters from frames that carried no PS
    /// payload are held over, so the mix keeps converging to the last decoded targets.
    pub fn apply(
        &mut self,
        left: &mut [[Cplx; QMF_BANDS]; QMF_SLOTS],
        right: &mut [[Cplx; QMF_BANDS]; QMF_SLOTS],
    ) {
        // First frame of a stream without any decoded payload yet: synthesize the neutral
        // parameter set.
        if self.params.num_env == 0 {
            self.params.decode();
        }

        let mut env = 0;

        for slot in 0..QMF_SLOTS {
            let input = &left[slot];
            let low = [input[0], input[1], input[2]];

            // Bands outside the filterbank are delayed to stay time aligned with it.
            let mut qmf_s = [Cplx::ZERO; NO_QMF_BANDS];
            for (band, line) in self.qmf_delay.iter_mut().enumerate() {
                qmf_s[band] = line[self.qmf_delay_idx];
                line[self.qmf_delay_idx] = input[band + QMF_START_BAND];
            }
            self.qmf_delay_idx = (self.qmf_delay_idx + 1) % HYBRID_FILTER_DELAY;

            let mut hybrid_s = self.hybrid.analyze(&low);

            if env < self.params.num_env && self.params.borders[env] == slot as i32 {
                let len = self.params.borders[env + 1] - self.params.borders[env];
                self.stereo.start_envelope(&self.params, env, len);
                env += 1;
            }

            let (mut hybrid_d, mut qmf_d) = self.decorrelator.decorrelate(&hybrid_s, &qmf_s);

            self.stereo.mix(&mut hybrid_s, &mut hybrid_d, &mut qmf_s, &mut qmf_d);

            let l_low = Hybrid::synthesize(&hybrid_s);
            let r_low = Hybrid::synthesize(&hybrid_d);

            left[slot][..HYBRID_BANDS].copy_from_slice(&l_low);
            right[slot][..HYBRID_BANDS].copy_from_slice(&r_low);
            left[slot][QMF_START_BAND..].copy_from_slice(&qmf_s);
            right[slot][QMF_START_BAND..].copy_from_slice(&qmf_d);
        }
    }
}

impl Default for PsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_group_bins_are_uniform() {
        // Every band of a QMF group must map to the group's bin.
        for group in HYBRID_CHANNELS..NO_STEREO_GROUPS {
            let bin = group_bin(group);
            let lo = QMF_GROUP_BORDERS[group - HYBRID_CHANNELS];
            let hi = QMF_GROUP_BORDERS[group - HYBRID_CHANNELS + 1];
            for band in lo..hi {
                assert_eq!(K_TO_BIN[HYBRID_CHANNELS + band - QMF_START_BAND], bin);
            }
        }
    }

    #[test]
    fn verify_neutral_parameters_reconstruct_identical_channels() {
        let mut ps = PsDecoder::new();

        let mut left = [[Cplx::ZERO; QMF_BANDS]; QMF_SLOTS];
        for (slot, row) in left.iter_mut().enumerate() {
            for (band, v) in row.iter_mut().enumerate() {
                let t = (slot * QMF_BANDS + band) as i64;
                *v = Cplx::new(
                    ((t * 193 + 17) % 4001 - 2000) as i32 * (1 << 14),
                    ((t * 71 + 3) % 4001 - 2000) as i32 * (1 << 14),
                );
            }
        }
        let mut right = [[Cplx::ZERO; QMF_BANDS]; QMF_SLOTS];

        ps.apply(&mut left, &mut right);

        // No PS payload was decoded: the mixing matrix is the exact identity, so the right
        // channel equals the left bit for bit across every slot and band.
        assert_eq!(ps.params.num_env, 1);
        for slot in 0..QMF_SLOTS {
            for band in 0..QMF_BANDS {
                assert_eq!(right[slot][band], left[slot][band], "slot {} band {}", slot, band);
            }
        }
    }
}
