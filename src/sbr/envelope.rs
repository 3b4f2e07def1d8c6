// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-channel SBR side information: dtdf flags, inverse-filtering modes, envelope
//! scale-factors, noise floors, and additional-harmonics flags.

use crate::bs::BitReader;
use crate::common::*;
use crate::errors::Result;
use crate::huffman;
use crate::sbr::codebooks::*;
use crate::sbr::frame_info::FrameInfo;

/// Envelope amplitude resolution, selected by the header and forced to 3.0 dB for
/// single-envelope FIXFIX frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmpRes {
    Res1_5Db,
    Res3_0Db,
}

/// Channel-pair coupling mode. In a coupled pair, channel 0 carries levels and channel 1
/// carries the balance parameters with their own codebook set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouplingMode {
    Off,
    Level,
    Balance,
}

/// Largest valid envelope scale-factor index.
const MAX_ENV_SF: i32 = 127;
/// Largest valid noise-floor scale-factor index.
const MAX_NOISE_SF: i32 = 63;

/// Per-channel decoded SBR side information with the previous-frame state required by the
/// time-differential decode paths.
///
/// The `*_prev` fields are written only by [`ChannelData::update_previous`]; a frame that fails
/// mid-decode therefore leaves them at the last good frame's values.
#[derive(Clone)]
pub struct ChannelData {
    pub frame_info: FrameInfo,
    pub amp_res: AmpRes,
    /// Per-envelope domain flag: true = time-differential, false = frequency-differential.
    pub df_env: [bool; MAX_ENVELOPES],
    pub df_noise: [bool; MAX_NOISE_ENVELOPES],
    /// 2-bit inverse-filtering mode per noise band.
    pub invf_mode: [u8; MAX_NOISE_COEFFS],
    pub invf_mode_prev: [u8; MAX_NOISE_COEFFS],
    /// Absolute envelope scale-factor indices, per envelope and band.
    pub env_sf: [[i32; MAX_FREQ_COEFFS]; MAX_ENVELOPES],
    /// Last envelope of the previous frame.
    pub env_sf_prev: [i32; MAX_FREQ_COEFFS],
    /// Frequency resolution of `env_sf_prev`.
    pub freq_res_prev: u8,
    pub noise_sf: [[i32; MAX_NOISE_COEFFS]; MAX_NOISE_ENVELOPES],
    pub noise_sf_prev: [i32; MAX_NOISE_COEFFS],
    pub add_harmonic_flag: bool,
    pub add_harmonic: [bool; MAX_FREQ_COEFFS],
}

impl ChannelData {
    pub fn new() -> Self {
        ChannelData {
            frame_info: FrameInfo::default(),
            amp_res: AmpRes::Res3_0Db,
            df_env: [false; MAX_ENVELOPES],
            df_noise: [false; MAX_NOISE_ENVELOPES],
            invf_mode: [0; MAX_NOISE_COEFFS],
            invf_mode_prev: [0; MAX_NOISE_COEFFS],
            env_sf: [[0; MAX_FREQ_COEFFS]; MAX_ENVELOPES],
            env_sf_prev: [0; MAX_FREQ_COEFFS],
            freq_res_prev: 0,
            noise_sf: [[0; MAX_NOISE_COEFFS]; MAX_NOISE_ENVELOPES],
            noise_sf_prev: [0; MAX_NOISE_COEFFS],
            add_harmonic_flag: false,
            add_harmonic: [false; MAX_FREQ_COEFFS],
        }
    }

    /// Reads the per-envelope and per-noise-floor domain (time/frequency) flags.
    pub fn read_dtdf(&mut self, bs: &mut BitReader<'_>) -> Result<()> {
        for i in 0..self.frame_info.num_env {
            self.df_env[i] = bs.read_bool()?;
        }
        for i in 0..self.frame_info.num_noise_env {
            self.df_noise[i] = bs.read_bool()?;
        }
        Ok(())
    }

    /// Reads the 2-bit inverse-filtering mode for each noise band.
    pub fn read_invf(&mut self, bs: &mut BitReader<'_>, num_noise_bands: usize) -> Result<()> {
        for i in 0..num_noise_bands {
            self.invf_mode[i] = bs.read_bits(2)? as u8;
        }
        Ok(())
    }

    /// Reads and resolves the envelope scale-factors into absolute indices.
    ///
    /// `num_env_bands` is the band count per frequency resolution (low, high). A
    /// frequency-differential envelope starts from an absolute value whose width depends on the
    /// amplitude resolution and coupling role; a time-differential envelope decodes against the
    /// previous envelope (or the previous frame's last envelope), mapping band indices when the
    /// two resolutions differ.
    pub fn read_envelope(
        &mut self,
        bs: &mut BitReader<'_>,
        num_env_bands: [usize; 2],
        coupling: CouplingMode,
    ) -> Result<()> {
        let balance = coupling == CouplingMode::Balance;

        let (start_bits, t_huff, f_huff): (u32, &huffman::HuffmanTree, &huffman::HuffmanTree) =
            match (self.amp_res, balance) {
                (AmpRes::Res1_5Db, false) => (7, &T_HUFFMAN_ENV_1_5DB, &F_HUFFMAN_ENV_1_5DB),
                (AmpRes::Res3_0Db, false) => (6, &T_HUFFMAN_ENV_3_0DB, &F_HUFFMAN_ENV_3_0DB),
                (AmpRes::Res1_5Db, true) => {
                    (6, &T_HUFFMAN_ENV_BAL_1_5DB, &F_HUFFMAN_ENV_BAL_1_5DB)
                }
                (AmpRes::Res3_0Db, true) => {
                    (5, &T_HUFFMAN_ENV_BAL_3_0DB, &F_HUFFMAN_ENV_BAL_3_0DB)
                }
            };

        for env in 0..self.frame_info.num_env {
            let res = self.frame_info.freq_res[env] as usize;
            let num_bands = num_env_bands[res];
            validate!(num_bands <= MAX_FREQ_COEFFS);

            if !self.df_env[env] {
                self.env_sf[env][0] = bs.read_bits(start_bits)? as i32;

                for band in 1..num_bands {
                    let delta = huffman::decode(bs, f_huff)?;
                    self.env_sf[env][band] = self.env_sf[env][band - 1] + delta;
                }
            }
            else {
                // The reference envelope: the preceding envelope in this frame, or the last
                // envelope of the previous frame.
                let (prev, prev_res) = if env == 0 {
                    (&self.env_sf_prev, self.freq_res_prev as usize)
                }
                else {
                    (&self.env_sf[env - 1], self.frame_info.freq_res[env - 1] as usize)
                };

                // Duplicated borrow of `prev` is avoided by resolving into a scratch row.
                let mut row = [0i32; MAX_FREQ_COEFFS];

                for (band, value) in row.iter_mut().enumerate().take(num_bands) {
                    let delta = huffman::decode(bs, t_huff)?;

                    // Map the band index when the resolutions differ: high-resolution bands
                    // pair off two-to-one onto low-resolution bands.
                    let r = match (res, prev_res) {
                        (1, 0) => prev[band / 2],
                        (0, 1) => prev[band * 2],
                        _ => prev[band],
                    };

                    *value = r + delta;
                }

                self.env_sf[env][..num_bands].copy_from_slice(&row[..num_bands]);
            }

            for band in 0..num_bands {
                validate!((0..=MAX_ENV_SF).contains(&self.env_sf[env][band]));
            }
        }

        Ok(())
    }

    /// Reads and resolves the noise-floor scale-factors.
    ///
    /// Noise floors use a fixed 5-bit start value and the 3.0 dB codebook family; frequency
    /// deltas share the envelope frequency tables, time deltas have their own.
    pub fn read_noise(
        &mut self,
        bs: &mut BitReader<'_>,
        num_noise_bands: usize,
        coupling: CouplingMode,
    ) -> Result<()> {
        validate!(num_noise_bands <= MAX_NOISE_COEFFS);

        let (t_huff, f_huff): (&huffman::HuffmanTree, &huffman::HuffmanTree) =
            if coupling == CouplingMode::Balance {
                (&T_HUFFMAN_NOISE_BAL_3_0DB, &F_HUFFMAN_ENV_BAL_3_0DB)
            }
            else {
                (&T_HUFFMAN_NOISE_3_0DB, &F_HUFFMAN_ENV_3_0DB)
            };

        for env in 0..self.frame_info.num_noise_env {
            if !self.df_noise[env] {
                self.noise_sf[env][0] = bs.read_bits(5)? as i32;

                for band in 1..num_noise_bands {
                    let delta = huffman::decode(bs, f_huff)?;
                    self.noise_sf[env][band] = self.noise_sf[env][band - 1] + delta;
                }
            }
            else {
                let mut row = [0i32; MAX_NOISE_COEFFS];

                {
                    let prev =
                        if env == 0 { &self.noise_sf_prev } else { &self.noise_sf[env - 1] };

                    for (band, value) in row.iter_mut().enumerate().take(num_noise_bands) {
                        let delta = huffman::decode(bs, t_huff)?;
                        *value = prev[band] + delta;
                    }
                }

                self.noise_sf[env][..num_noise_bands].copy_from_slice(&row[..num_noise_bands]);
            }

            for band in 0..num_noise_bands {
                validate!((0..=MAX_NOISE_SF).contains(&self.noise_sf[env][band]));
            }
        }

        Ok(())
    }

    /// Reads the additional-harmonics (sinusoid) flags, one per high-resolution band.
    pub fn read_additional_harmonics(
        &mut self,
        bs: &mut BitReader<'_>,
        num_high_bands: usize,
    ) -> Result<()> {
        validate!(num_high_bands <= MAX_FREQ_COEFFS);

        self.add_harmonic = [false; MAX_FREQ_COEFFS];
        self.add_harmonic_flag = bs.read_bool()?;

        if self.add_harmonic_flag {
            for flag in self.add_harmonic.iter_mut().take(num_high_bands) {
                *flag = bs.read_bool()?;
            }
        }
        Ok(())
    }

    /// Copies the frame's trailing state into the previous-frame fields.
    ///
    /// Called once per successfully decoded frame; the time-differential paths of the next
    /// frame decode against these copies.
    pub fn update_previous(&mut self, num_env_bands: [usize; 2], num_noise_bands: usize) {
        let last_env = self.frame_info.num_env - 1;
        let res = self.frame_info.freq_res[last_env];

        let num_bands = num_env_bands[res as usize].min(MAX_FREQ_COEFFS);
        self.env_sf_prev[..num_bands].copy_from_slice(&self.env_sf[last_env][..num_bands]);
        self.freq_res_prev = res;

        let last_noise = self.frame_info.num_noise_env - 1;
        let nb = num_noise_bands.min(MAX_NOISE_COEFFS);
        self.noise_sf_prev[..nb].copy_from_slice(&self.noise_sf[last_noise][..nb]);

        self.invf_mode_prev = self.invf_mode;
    }
}

impl Default for ChannelData {
    fn default() -> Self {
        Self::new()
    }
}
