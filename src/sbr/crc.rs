// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CRC-10 integrity check of the SBR payload.

use crate::bs::BitReader;
use crate::errors::Result;

const CRC_POLY: u32 = 0x0233;
const CRC_MASK: u32 = 0x0200;
const CRC_RANGE: u32 = 0x03ff;

/// Advances the CRC state by a single bit.
#[inline(always)]
fn crc_advance(state: u32, bit: u32) -> u32 {
    let flag = u32::from(state & CRC_MASK != 0) ^ bit;

    let state = (state << 1) & CRC_RANGE;

    if flag != 0 {
        state ^ CRC_POLY
    }
    else {
        state
    }
}

/// Feeds the low `len` bits of `bits` (MSB-first) into the CRC state.
fn crc_bits(mut state: u32, bits: u32, len: u32) -> u32 {
    for i in (0..len).rev() {
        state = crc_advance(state, (bits >> i) & 1);
    }
    state
}

/// Validates the SBR payload checksum.
///
/// The reader must be positioned just past the 10-bit checksum field. The CRC is computed over
/// the next `nr_bits` bits, clamped to what remains in the buffer, consumed in chunks of at
/// most 16 bits on a cloned position (the caller's reader is not advanced).
///
/// Returns `true` iff the computed checksum matches `crc_check_sum`.
pub fn sbr_crc_check(bs: &BitReader<'_>, nr_bits: u32, crc_check_sum: u32) -> Result<bool> {
    let mut bs = bs.clone();
    let nr_bits = nr_bits.min(bs.bits_left());

    let mut state = 0;

    let mut left = nr_bits;
    while left >= 16 {
        state = crc_bits(state, bs.read_bits(16)?, 16);
        left -= 16;
    }
    if left > 0 {
        state = crc_bits(state, bs.read_bits(left)?, left);
    }

    Ok(state == (crc_check_sum & CRC_RANGE))
}
