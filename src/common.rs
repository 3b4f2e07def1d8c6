// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constants and helpers shared by the SBR and PS readers.

/// Maximum number of SBR envelopes per frame.
pub const MAX_ENVELOPES: usize = 5;

/// Maximum number of SBR noise-floor envelopes per frame.
pub const MAX_NOISE_ENVELOPES: usize = 2;

/// Maximum number of SBR envelope scale-factor bands.
pub const MAX_FREQ_COEFFS: usize = 48;

/// Maximum number of SBR noise-floor bands.
pub const MAX_NOISE_COEFFS: usize = 5;

/// Envelope time borders are expressed in units of 1/16th of a frame.
pub const SBR_TIME_SLOTS: i32 = 16;

/// Width of the SBR payload checksum field.
pub const SBR_CRC_BITS: u32 = 10;

macro_rules! validate {
    ($a:expr) => {
        if !$a {
            log::error!("check failed at {}:{}", file!(), line!());
            return crate::errors::decode_error("sbr: invalid data");
        }
    };
}

pub(crate) use validate;
