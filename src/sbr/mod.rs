// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spectral Band Replication side-information decoding.

use crate::bs::BitReader;
use crate::common::*;
use crate::errors::Result;
use crate::ps::PsDecoder;

pub mod codebooks;
pub mod crc;
pub mod envelope;
pub mod extension;
pub mod frame_info;

use envelope::{AmpRes, ChannelData, CouplingMode};
use frame_info::FrameClass;

/// Band counts derived by the collaborating core decoder from the sampling rate and the
/// header's frequency-table fields.
#[derive(Clone, Copy, Debug)]
pub struct SbrBands {
    /// Envelope scale-factor band count per frequency resolution (low, high).
    pub num_env_bands: [usize; 2],
    /// Noise-floor band count (at most 5).
    pub num_noise_bands: usize,
}

/// A decoded SBR header. Re-read whenever the in-band header flag is set; most fields carry
/// defaults when the extra field groups are absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SbrHeader {
    pub amp_res: AmpRes,
    pub start_freq: u32,
    pub stop_freq: u32,
    pub xover_band: u32,
    pub freq_scale: u32,
    pub alter_scale: bool,
    pub noise_bands: u32,
    pub limiter_bands: u32,
    pub limiter_gains: u32,
    pub interpol_freq: bool,
    pub smoothing_mode: bool,
}

impl SbrHeader {
    fn read(bs: &mut BitReader<'_>) -> Result<SbrHeader> {
        let amp_res = if bs.read_bool()? { AmpRes::Res3_0Db } else { AmpRes::Res1_5Db };
        let start_freq = bs.read_bits(4)?;
        let stop_freq = bs.read_bits(4)?;
        let xover_band = bs.read_bits(3)?;
        // bs_reserved
        bs.ignore_bits(2)?;

        let header_extra_1 = bs.read_bool()?;
        let header_extra_2 = bs.read_bool()?;

        let mut header = SbrHeader {
            amp_res,
            start_freq,
            stop_freq,
            xover_band,
            freq_scale: 2,
            alter_scale: true,
            noise_bands: 2,
            limiter_bands: 2,
            limiter_gains: 2,
            interpol_freq: true,
            smoothing_mode: true,
        };

        if header_extra_1 {
            header.freq_scale = bs.read_bits(2)?;
            header.alter_scale = bs.read_bool()?;
            header.noise_bands = bs.read_bits(2)?;
        }
        if header_extra_2 {
            header.limiter_bands = bs.read_bits(2)?;
            header.limiter_gains = bs.read_bits(2)?;
            header.interpol_freq = bs.read_bool()?;
            header.smoothing_mode = bs.read_bool()?;
        }

        Ok(header)
    }

    /// True when the fields governing the frequency-table derivation differ, which obliges
    /// the surrounding decoder to rebuild its tables and this decoder to reset its history.
    fn requires_reset(&self, other: &SbrHeader) -> bool {
        self.start_freq != other.start_freq
            || self.stop_freq != other.stop_freq
            || self.xover_band != other.xover_band
            || self.freq_scale != other.freq_scale
            || self.alter_scale != other.alter_scale
            || self.noise_bands != other.noise_bands
    }
}

/// SBR side-information decoder for one channel element (SCE or CPE).
///
/// Holds the persistent per-channel state; the bitstream readers mutate the current-frame
/// arrays and the previous-frame copies are taken only after a frame decodes completely, so a
/// failed frame never corrupts the state the next frame decodes against.
pub struct SbrDecoder {
    bands: SbrBands,
    header: Option<SbrHeader>,
    channels: [ChannelData; 2],
    coupling: bool,
    /// Present when the stream may carry Parametric Stereo (HE-AAC v2 single-channel
    /// elements).
    pub ps: Option<PsDecoder>,
}

impl SbrDecoder {
    pub fn new(bands: SbrBands, enable_ps: bool) -> Result<SbrDecoder> {
        validate!(bands.num_env_bands[0] <= MAX_FREQ_COEFFS);
        validate!(bands.num_env_bands[1] <= MAX_FREQ_COEFFS);
        validate!(bands.num_noise_bands <= MAX_NOISE_COEFFS);

        Ok(SbrDecoder {
            bands,
            header: None,
            channels: [ChannelData::new(), ChannelData::new()],
            coupling: false,
            ps: if enable_ps { Some(PsDecoder::new()) } else { None },
        })
    }

    pub fn header(&self) -> Option<&SbrHeader> {
        self.header.as_ref()
    }

    pub fn channel(&self, ch: usize) -> &ChannelData {
        &self.channels[ch]
    }

    pub fn is_coupled(&self) -> bool {
        self.coupling
    }

    /// Drops history that is meaningless across a frequency-table change.
    fn reset(&mut self) {
        for ch in self.channels.iter_mut() {
            let amp_res = ch.amp_res;
            *ch = ChannelData::new();
            ch.amp_res = amp_res;
        }
        if let Some(ps) = self.ps.as_mut() {
            ps.reset();
        }
    }

    /// Reads the optional in-band header. Returns false when no header has been seen yet, in
    /// which case the frame cannot be decoded.
    fn read_header(&mut self, bs: &mut BitReader<'_>) -> Result<bool> {
        if bs.read_bool()? {
            let header = SbrHeader::read(bs)?;

            match self.header {
                Some(ref old) if old.requires_reset(&header) => {
                    log::debug!("sbr: header change, resetting decoder state");
                    self.reset();
                }
                _ => (),
            }
            self.header = Some(header);
        }
        Ok(self.header.is_some())
    }

    /// The amplitude resolution is taken from the header, but forced to 3.0 dB for a frame
    /// carrying one single full-length envelope.
    fn apply_amp_res(&mut self, ch: usize, amp_res: AmpRes) {
        let info = &self.channels[ch].frame_info;

        self.channels[ch].amp_res =
            if info.frame_class == FrameClass::FixFix && info.num_env == 1 {
                AmpRes::Res3_0Db
            }
            else {
                amp_res
            };
    }

    /// Decodes a single-channel-element SBR payload. With `has_crc`, the payload begins with
    /// a 10-bit checksum over the rest of the payload.
    ///
    /// Returns false when the frame was skipped (checksum mismatch, or no header seen yet);
    /// the persistent state is left untouched in that case.
    pub fn read_sce(&mut self, buf: &[u8]) -> Result<bool> {
        self.read_element(buf, false, false)
    }

    pub fn read_sce_crc(&mut self, buf: &[u8]) -> Result<bool> {
        self.read_element(buf, false, true)
    }

    /// Decodes a channel-pair-element SBR payload, with or without a leading checksum.
    pub fn read_cpe(&mut self, buf: &[u8]) -> Result<bool> {
        self.read_element(buf, true, false)
    }

    pub fn read_cpe_crc(&mut self, buf: &[u8]) -> Result<bool> {
        self.read_element(buf, true, true)
    }

    fn read_element(&mut self, buf: &[u8], pair: bool, has_crc: bool) -> Result<bool> {
        let mut bs = BitReader::new(buf);

        if has_crc {
            let crc_check_sum = bs.read_bits(SBR_CRC_BITS)?;

            if !crc::sbr_crc_check(&bs, bs.bits_left(), crc_check_sum)? {
                log::debug!("sbr: crc mismatch, skipping frame");
                return Ok(false);
            }
        }

        if !self.read_header(&mut bs)? {
            log::debug!("sbr: no header seen yet, skipping frame");
            return Ok(false);
        }

        // The header is guaranteed present past read_header.
        let amp_res = match self.header {
            Some(ref h) => h.amp_res,
            None => AmpRes::Res3_0Db,
        };

        if pair {
            self.read_cpe_data(&mut bs, amp_res)?;
        }
        else {
            self.read_sce_data(&mut bs, amp_res)?;
        }

        for ch in 0..if pair { 2 } else { 1 } {
            self.channels[ch].update_previous(self.bands.num_env_bands, self.bands.num_noise_bands);
        }

        Ok(true)
    }

    fn read_sce_data(&mut self, bs: &mut BitReader<'_>, amp_res: AmpRes) -> Result<()> {
        let bands = self.bands;
        self.coupling = false;

        self.channels[0].frame_info = frame_info::extract_frame_info(bs)?;
        self.apply_amp_res(0, amp_res);

        let ch = &mut self.channels[0];
        ch.read_dtdf(bs)?;
        ch.read_invf(bs, bands.num_noise_bands)?;
        ch.read_envelope(bs, bands.num_env_bands, CouplingMode::Off)?;
        ch.read_noise(bs, bands.num_noise_bands, CouplingMode::Off)?;
        ch.read_additional_harmonics(bs, bands.num_env_bands[1])?;

        extension::extract_extended_data(bs, self.ps.as_mut().map(|ps| &mut ps.params))?;

        if let Some(ps) = self.ps.as_mut() {
            if ps.params.data_available {
                ps.params.decode();
            }
        }

        Ok(())
    }

    fn read_cpe_data(&mut self, bs: &mut BitReader<'_>, amp_res: AmpRes) -> Result<()> {
        let bands = self.bands;
        self.coupling = bs.read_bool()?;

        if self.coupling {
            self.channels[0].frame_info = frame_info::extract_frame_info(bs)?;
            self.channels[1].frame_info = self.channels[0].frame_info.clone();
            self.apply_amp_res(0, amp_res);
            self.apply_amp_res(1, amp_res);

            self.channels[0].read_dtdf(bs)?;
            self.channels[1].read_dtdf(bs)?;

            self.channels[0].read_invf(bs, bands.num_noise_bands)?;
            self.channels[1].invf_mode = self.channels[0].invf_mode;

            self.channels[0].read_envelope(bs, bands.num_env_bands, CouplingMode::Level)?;
            self.channels[0].read_noise(bs, bands.num_noise_bands, CouplingMode::Level)?;
            self.channels[1].read_envelope(bs, bands.num_env_bands, CouplingMode::Balance)?;
            self.channels[1].read_noise(bs, bands.num_noise_bands, CouplingMode::Balance)?;
        }
        else {
            self.channels[0].frame_info = frame_info::extract_frame_info(bs)?;
            self.channels[1].frame_info = frame_info::extract_frame_info(bs)?;
            self.apply_amp_res(0, amp_res);
            self.apply_amp_res(1, amp_res);

            self.channels[0].read_dtdf(bs)?;
            self.channels[1].read_dtdf(bs)?;

            self.channels[0].read_invf(bs, bands.num_noise_bands)?;
            self.channels[1].read_invf(bs, bands.num_noise_bands)?;

            self.channels[0].read_envelope(bs, bands.num_env_bands, CouplingMode::Off)?;
            self.channels[1].read_envelope(bs, bands.num_env_bands, CouplingMode::Off)?;
            self.channels[0].read_noise(bs, bands.num_noise_bands, CouplingMode::Off)?;
            self.channels[1].read_noise(bs, bands.num_noise_bands, CouplingMode::Off)?;
        }

        self.channels[0].read_additional_harmonics(bs, bands.num_env_bands[1])?;
        self.channels[1].read_additional_harmonics(bs, bands.num_env_bands[1])?;

        // A channel pair never carries Parametric Stereo.
        extension::extract_extended_data(bs, None)?;

        Ok(())
    }
}
