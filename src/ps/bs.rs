// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric Stereo bitstream reading and index decoding.
//!
//! Reading and decoding are split: [`PsParams::read`] pulls the raw Huffman deltas off the
//! bitstream, [`PsParams::decode`] resolves them into absolute IID/ICC indices against the
//! previous frame and finalises the envelope borders.

use crate::bs::BitReader;
use crate::errors::Result;
use crate::huffman;
use crate::ps::codebooks::*;

/// Number of parameter bins at the high (34-bin) frequency resolution.
pub const NO_HI_RES_BINS: usize = 34;

/// Number of parameter bins after the 34-to-20 remap, and at the mid resolution.
pub const NO_MID_RES_BINS: usize = 20;

/// Maximum number of PS envelopes, including the one appended when the last signalled border
/// falls short of the frame end.
pub const MAX_PS_ENVELOPES: usize = 5;

/// QMF sub-samples (time slots) per PS frame.
pub const NO_SUB_SAMPLES: i32 = 32;

/// Parameter bin count per frequency-resolution selector.
const NO_BINS_PER_RES: [usize; 3] = [10, 20, 34];

/// Envelope count for the fixed-border frame class, indexed by the 2-bit count selector.
const FIX_NO_ENV_DECODE: [usize; 4] = [0, 1, 2, 4];

/// Bitstream-side Parametric Stereo state: enable flags, frequency resolutions, per-envelope
/// IID/ICC index arrays, and the previous-frame arrays the time-differential decode needs.
#[derive(Clone)]
pub struct PsParams {
    pub enable_iid: bool,
    pub enable_icc: bool,
    pub enable_ext: bool,
    /// IID frequency resolution 0..=2 after the fine-quantisation rebase. Values above 2 are
    /// reserved and cause the frame's payload to be skipped.
    pub iid_mode: u32,
    pub icc_mode: u32,
    pub fine_iid: bool,
    pub frame_class: u32,
    pub num_env: usize,
    /// Envelope borders in sub-samples, `borders[0..=num_env]`.
    pub borders: [i32; MAX_PS_ENVELOPES + 1],
    pub iid_dt: [bool; MAX_PS_ENVELOPES],
    pub icc_dt: [bool; MAX_PS_ENVELOPES],
    /// Raw deltas after [`PsParams::read`], absolute indices after [`PsParams::decode`].
    pub iid_index: [[i32; NO_HI_RES_BINS]; MAX_PS_ENVELOPES],
    pub icc_index: [[i32; NO_HI_RES_BINS]; MAX_PS_ENVELOPES],
    pub iid_index_prev: [i32; NO_HI_RES_BINS],
    pub icc_index_prev: [i32; NO_HI_RES_BINS],
    /// Set by a complete [`PsParams::read`], cleared by [`PsParams::decode`]. Stays false
    /// when a reserved resolution skips the payload.
    pub data_available: bool,
}

impl PsParams {
    pub fn new() -> Self {
        PsParams {
            enable_iid: false,
            enable_icc: false,
            enable_ext: false,
            iid_mode: 0,
            icc_mode: 0,
            fine_iid: false,
            frame_class: 0,
            num_env: 0,
            borders: [0; MAX_PS_ENVELOPES + 1],
            iid_dt: [false; MAX_PS_ENVELOPES],
            icc_dt: [false; MAX_PS_ENVELOPES],
            iid_index: [[0; NO_HI_RES_BINS]; MAX_PS_ENVELOPES],
            icc_index: [[0; NO_HI_RES_BINS]; MAX_PS_ENVELOPES],
            iid_index_prev: [0; NO_HI_RES_BINS],
            icc_index_prev: [0; NO_HI_RES_BINS],
            data_available: false,
        }
    }

    /// Reads one PS payload of at most `num_bits` bits. Returns the number of bits consumed.
    ///
    /// A reserved frequency resolution abandons the frame: the remaining payload is skipped
    /// byte-wise and `data_available` stays false.
    pub fn read(&mut self, bs: &mut BitReader<'_>, num_bits: u32) -> Result<u32> {
        let start = bs.bits_read();

        if bs.read_bool()? {
            self.enable_iid = bs.read_bool()?;
            if self.enable_iid {
                let mode = bs.read_bits(3)?;
                // Modes 3..=5 signal the fine 15-step quantisation of modes 0..=2.
                self.fine_iid = mode > 2 && mode < 6;
                self.iid_mode = if self.fine_iid { mode - 3 } else { mode };
            }

            self.enable_icc = bs.read_bool()?;
            if self.enable_icc {
                self.icc_mode = bs.read_bits(3)?;
            }

            self.enable_ext = bs.read_bool()?;
        }

        self.frame_class = bs.read_bit()?;

        if self.frame_class == 0 {
            self.num_env = FIX_NO_ENV_DECODE[bs.read_bits(2)? as usize];
        }
        else {
            self.num_env = 1 + bs.read_bits(2)? as usize;
            for env in 1..=self.num_env {
                self.borders[env] = bs.read_bits(5)? as i32 + 1;
            }
        }

        if self.iid_mode > 2 || self.icc_mode > 2 {
            log::debug!("ps: reserved frequency resolution, skipping payload");

            let mut consumed = bs.bits_read() - start;
            while num_bits.saturating_sub(consumed) >= 8 && bs.bits_left() >= 8 {
                bs.ignore_bits(8)?;
                consumed += 8;
            }
            let tail = num_bits.saturating_sub(consumed).min(bs.bits_left());
            bs.ignore_bits(tail)?;

            self.data_available = false;
            return Ok(bs.bits_read() - start);
        }

        if self.enable_iid {
            let bins = NO_BINS_PER_RES[self.iid_mode as usize];
            for env in 0..self.num_env {
                self.iid_dt[env] = bs.read_bool()?;

                let table: &huffman::HuffmanTree = match (self.iid_dt[env], self.fine_iid) {
                    (true, false) => &HUFF_IID_DEFAULT_TIME,
                    (false, false) => &HUFF_IID_DEFAULT_FREQ,
                    (true, true) => &HUFF_IID_FINE_TIME,
                    (false, true) => &HUFF_IID_FINE_FREQ,
                };

                for bin in 0..bins {
                    self.iid_index[env][bin] = huffman::decode(bs, table)?;
                }
            }
        }

        if self.enable_icc {
            let bins = NO_BINS_PER_RES[self.icc_mode as usize];
            for env in 0..self.num_env {
                self.icc_dt[env] = bs.read_bool()?;

                let table: &huffman::HuffmanTree =
                    if self.icc_dt[env] { &HUFF_ICC_TIME } else { &HUFF_ICC_FREQ };

                for bin in 0..bins {
                    self.icc_index[env][bin] = huffman::decode(bs, table)?;
                }
            }
        }

        if self.enable_ext {
            let mut cnt = bs.read_bits(4)?;
            if cnt == 15 {
                cnt += bs.read_bits(8)?;
            }
            bs.ignore_bits(8 * cnt)?;
        }

        self.data_available = true;
        Ok(bs.bits_read() - start)
    }

    /// Resolves the raw deltas into absolute indices and finalises the envelope borders.
    pub fn decode(&mut self) {
        // A frame without envelopes carries the previous parameters forward: synthesize one
        // time-differential envelope of all-zero deltas.
        if self.num_env == 0 {
            self.num_env = 1;
            self.iid_dt[0] = true;
            self.icc_dt[0] = true;
            self.iid_index[0] = [0; NO_HI_RES_BINS];
            self.icc_index[0] = [0; NO_HI_RES_BINS];
        }

        let iid_steps = if self.fine_iid { 15 } else { 7 };
        let iid_bins = NO_BINS_PER_RES[self.iid_mode as usize];
        let iid_stride = if self.iid_mode == 0 { 2 } else { 1 };
        let icc_bins = NO_BINS_PER_RES[self.icc_mode as usize];
        let icc_stride = if self.icc_mode == 0 { 2 } else { 1 };

        for env in 0..self.num_env {
            let (head, tail) = self.iid_index.split_at_mut(env);
            let prev = if env == 0 { &self.iid_index_prev } else { &head[env - 1] };
            differential_decoding(
                self.enable_iid,
                &mut tail[0],
                prev,
                self.iid_dt[env],
                iid_bins,
                iid_stride,
                -iid_steps,
                iid_steps,
            );

            let (head, tail) = self.icc_index.split_at_mut(env);
            let prev = if env == 0 { &self.icc_index_prev } else { &head[env - 1] };
            differential_decoding(
                self.enable_icc,
                &mut tail[0],
                prev,
                self.icc_dt[env],
                icc_bins,
                icc_stride,
                0,
                7,
            );
        }

        // Next frame's time-differential decode references the last envelope of this frame.
        self.iid_index_prev = self.iid_index[self.num_env - 1];
        self.icc_index_prev = self.icc_index[self.num_env - 1];

        if self.frame_class == 0 {
            // Even subdivision: num_env is 1, 2, or 4, so num_env / 2 is the log2 shift.
            let shift = self.num_env as u32 / 2;
            for env in 0..=self.num_env {
                self.borders[env] = ((env as i32) * NO_SUB_SAMPLES) >> shift;
            }
        }
        else {
            self.borders[0] = 0;

            // If the last signalled border falls short of the frame end, append an envelope
            // holding the same parameters out to the end.
            if self.borders[self.num_env] < NO_SUB_SAMPLES {
                self.num_env += 1;
                self.borders[self.num_env] = NO_SUB_SAMPLES;
                self.iid_index[self.num_env - 1] = self.iid_index[self.num_env - 2];
                self.icc_index[self.num_env - 1] = self.icc_index[self.num_env - 2];
            }

            // Force monotone borders, keeping at least one sub-sample per envelope at the
            // frame boundary.
            for env in 1..self.num_env {
                let upper = NO_SUB_SAMPLES - (self.num_env - env) as i32;
                if self.borders[env] > upper {
                    self.borders[env] = upper;
                }
                else {
                    let lower = self.borders[env - 1] + 1;
                    if self.borders[env] < lower {
                        self.borders[env] = lower;
                    }
                }
            }
        }

        // The 34-bin high resolution is processed at 20 bins.
        if self.iid_mode == 2 {
            for env in 0..self.num_env {
                map34_index_to_20(&mut self.iid_index[env]);
            }
        }
        if self.icc_mode == 2 {
            for env in 0..self.num_env {
                map34_index_to_20(&mut self.icc_index[env]);
            }
        }

        // The raw deltas are spent. A following frame without a payload must not decode
        // these indices a second time.
        self.data_available = false;
    }
}

impl Default for PsParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves one envelope of differential indices in place.
///
/// Frequency-differential envelopes accumulate from 0 along the bins; time-differential
/// envelopes add each delta to the corresponding bin of `index_prev`. Every resolved value is
/// clamped to `[min_idx, max_idx]`. With `stride` 2 the `nr_par` resolved low-resolution
/// values are fanned out so bins `2i` and `2i + 1` share value `i`.
pub fn differential_decoding(
    enable: bool,
    index: &mut [i32],
    index_prev: &[i32],
    dt: bool,
    nr_par: usize,
    stride: usize,
    min_idx: i32,
    max_idx: i32,
) {
    if enable {
        if !dt {
            let mut last = 0;
            for i in 0..nr_par {
                last = (last + index[i]).clamp(min_idx, max_idx);
                index[i] = last;
            }
        }
        else {
            // The previous-frame array holds duplicated values when this envelope is at the
            // coarser resolution, hence the strided read.
            for i in 0..nr_par {
                index[i] = (index_prev[i * stride] + index[i]).clamp(min_idx, max_idx);
            }
        }
    }
    else {
        for v in index.iter_mut().take(nr_par) {
            *v = 0;
        }
    }

    if stride == 2 {
        for i in (1..2 * nr_par).rev() {
            index[i] = index[i / 2];
        }
    }
}

/// Remaps one envelope's 34-bin high-resolution indices onto the 20-bin grid.
///
/// The groupings and weights are fixed by the standard; reads stay ahead of writes so the
/// remap is done in place.
pub fn map34_index_to_20(index: &mut [i32; NO_HI_RES_BINS]) {
    index[0] = (2 * index[0] + index[1]) / 3;
    index[1] = (index[1] + 2 * index[2]) / 3;
    index[2] = (2 * index[3] + index[4]) / 3;
    index[3] = (index[4] + 2 * index[5]) / 3;
    index[4] = (index[6] + index[7]) / 2;
    index[5] = (index[8] + index[9]) / 2;
    index[6] = index[10];
    index[7] = index[11];
    index[8] = (index[12] + index[13]) / 2;
    index[9] = (index[14] + index[15]) / 2;
    index[10] = index[16];
    index[11] = index[17];
    index[12] = index[18];
    index[13] = index[19];
    index[14] = (index[20] + index[21]) / 2;
    index[15] = (index[22] + index[23]) / 2;
    index[16] = (index[24] + index[25]) / 2;
    index[17] = (index[26] + index[27]) / 2;
    index[18] = (index[28] + index[29] + index[30] + index[31]) / 4;
    index[19] = (index[32] + index[33]) / 2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bs::BitReader;
    use crate::huffman::tests::{encode, pack_bits, push_bits};

    #[test]
    fn verify_differential_decoding_freq_round_trip() {
        // Deltas chosen so the running sum stays in range: the absolute sequence must be
        // reproduced exactly.
        let deltas = [3, -1, 0, 4, -7, 2];
        let mut index = [0i32; NO_HI_RES_BINS];
        index[..6].copy_from_slice(&deltas);

        let prev = [0i32; NO_HI_RES_BINS];
        differential_decoding(true, &mut index, &prev, false, 6, 1, -7, 7);

        assert_eq!(index[..6], [3, 2, 2, 6, -1, 1]);
    }

    #[test]
    fn verify_differential_decoding_clamps() {
        let mut index = [0i32; NO_HI_RES_BINS];
        index[..4].copy_from_slice(&[6, 6, -20, 1]);

        let prev = [0i32; NO_HI_RES_BINS];
        differential_decoding(true, &mut index, &prev, false, 4, 1, -7, 7);

        // The clamped value, not the raw sum, seeds the next accumulation.
        assert_eq!(index[..4], [6, 7, -7, -6]);
    }

    #[test]
    fn verify_differential_decoding_time_with_stride() {
        let mut prev = [0i32; NO_HI_RES_BINS];
        for (i, v) in prev.iter_mut().enumerate() {
            *v = i as i32 % 5;
        }

        let mut index = [0i32; NO_HI_RES_BINS];
        index[..3].copy_from_slice(&[1, 0, -1]);

        // Low resolution: 3 parameters at stride 2 reference prev bins 0, 2, 4 and fan out
        // into bin pairs.
        differential_decoding(true, &mut index, &prev, true, 3, 2, -7, 7);

        assert_eq!(index[..6], [1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn verify_differential_decoding_disabled_zero_fills() {
        let mut index = [9i32; NO_HI_RES_BINS];
        let prev = [5i32; NO_HI_RES_BINS];
        differential_decoding(false, &mut index, &prev, true, 4, 2, -7, 7);

        assert_eq!(index[..8], [0; 8]);
    }

    #[test]
    fn verify_map34_to_20() {
        let mut zeros = [0i32; NO_HI_RES_BINS];
        map34_index_to_20(&mut zeros);
        assert_eq!(zeros[..NO_MID_RES_BINS], [0; NO_MID_RES_BINS]);

        // A single non-zero bin at index 0 contributes only to output bin 0, with 2/3 weight.
        let mut single = [0i32; NO_HI_RES_BINS];
        single[0] = 3;
        map34_index_to_20(&mut single);
        assert_eq!(single[0], 2);
        assert_eq!(single[1..NO_MID_RES_BINS], [0; NO_MID_RES_BINS - 1]);

        let mut tail = [0i32; NO_HI_RES_BINS];
        tail[32] = 4;
        tail[33] = 2;
        map34_index_to_20(&mut tail);
        assert_eq!(tail[19], 3);
    }

    #[test]
    fn verify_read_header_and_fixed_frame() {
        let mut bits = Vec::new();
        // header enable, iid enable, iid res 4 (fine, rebased to 1), icc enable, icc res 1,
        // ext disable.
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 4, 3);
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 1, 3);
        push_bits(&mut bits, 0, 1);
        // frame class 0, one envelope.
        push_bits(&mut bits, 0, 1);
        push_bits(&mut bits, 1, 2);
        // IID: dt=0, 20 fine-freq deltas of +1.
        push_bits(&mut bits, 0, 1);
        for _ in 0..20 {
            let (code, len) = encode(&HUFF_IID_FINE_FREQ, 1).unwrap();
            push_bits(&mut bits, code, len);
        }
        // ICC: dt=0, 20 zero deltas.
        push_bits(&mut bits, 0, 1);
        for _ in 0..20 {
            let (code, len) = encode(&HUFF_ICC_FREQ, 0).unwrap();
            push_bits(&mut bits, code, len);
        }
        let buf = pack_bits(&bits);

        let mut ps = PsParams::new();
        let mut bs = BitReader::new(&buf);
        let consumed = ps.read(&mut bs, 8 * buf.len() as u32).unwrap();
        assert_eq!(consumed, bs.bits_read());

        assert!(ps.data_available);
        assert!(ps.fine_iid);
        assert_eq!(ps.iid_mode, 1);
        assert_eq!(ps.num_env, 1);

        ps.decode();
        // Accumulated +1 deltas, clamped at the fine-quantisation limit of 15.
        assert_eq!(ps.iid_index[0][..5], [1, 2, 3, 4, 5]);
        assert_eq!(ps.icc_index[0][..5], [0; 5]);
        assert_eq!(ps.borders[..2], [0, 32]);
    }

    #[test]
    fn verify_reserved_resolution_skips_payload() {
        let mut bits = Vec::new();
        // header enable, iid enable, iid res 6 (reserved), icc disable, ext disable.
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 6, 3);
        push_bits(&mut bits, 0, 1);
        push_bits(&mut bits, 0, 1);
        // frame class 0, one envelope; then garbage padding.
        push_bits(&mut bits, 0, 1);
        push_bits(&mut bits, 1, 2);
        push_bits(&mut bits, 0x5a5a, 16);
        let buf = pack_bits(&bits);

        let mut ps = PsParams::new();
        let mut bs = BitReader::new(&buf);
        let num_bits = 8 * buf.len() as u32;
        let consumed = ps.read(&mut bs, num_bits).unwrap();

        assert!(!ps.data_available);
        assert_eq!(consumed, num_bits);
    }

    #[test]
    fn verify_zero_envelope_carries_previous_frame() {
        let mut ps = PsParams::new();
        ps.enable_iid = true;
        ps.iid_mode = 1;
        ps.num_env = 0;
        for (i, v) in ps.iid_index_prev.iter_mut().enumerate() {
            *v = (i as i32 % 3) - 1;
        }
        let prev = ps.iid_index_prev;

        ps.decode();

        assert_eq!(ps.num_env, 1);
        assert_eq!(ps.iid_index[0][..20], prev[..20]);
        // ICC is disabled this frame: zero-filled.
        assert_eq!(ps.icc_index[0][..20], [0; 20]);
    }

    #[test]
    fn verify_variable_border_finalisation() {
        let mut ps = PsParams::new();
        ps.frame_class = 1;
        ps.num_env = 2;
        ps.borders[1] = 10;
        ps.borders[2] = 25;
        ps.iid_index[1][0] = 4;

        ps.decode();

        // Border 25 < 32: a third envelope is appended to the frame end, inheriting the
        // last envelope's parameters.
        assert_eq!(ps.num_env, 3);
        assert_eq!(ps.borders[..4], [0, 10, 25, 32]);
        assert_eq!(ps.iid_index[2][0], ps.iid_index[1][0]);
    }

    #[test]
    fn verify_variable_borders_forced_monotone() {
        let mut ps = PsParams::new();
        ps.frame_class = 1;
        ps.num_env = 3;
        ps.borders[1] = 20;
        ps.borders[2] = 6;
        ps.borders[3] = 32;

        ps.decode();

        assert_eq!(ps.num_env, 3);
        // Border 6 is pulled up to keep the sequence monotone.
        assert_eq!(ps.borders[..4], [0, 20, 21, 32]);
    }
}
