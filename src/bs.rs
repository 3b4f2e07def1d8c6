// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `bs` module provides a bit reader for the SBR and PS side-information payloads.

use crate::errors::{out_of_bits_error, Result};

/// `BitReader` reads bits from most-significant to least-significant from a `&[u8]`.
///
/// Stated another way, if N bits are read then bit 0, the first bit read, is the
/// most-significant bit, and bit N-1, the last bit read, is the least-significant.
///
/// Every read is fallible: reading more bits than remain yields `Error::OutOfBits` instead of
/// running off the end of the buffer, and a failed read does not advance the position.
#[derive(Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    /// Total length of the bitstream in bits. May be less than `8 * buf.len()` when the payload
    /// does not end on a byte boundary.
    len: u32,
    /// Number of bits consumed so far. Invariant: `pos <= len`.
    pos: u32,
}

impl<'a> BitReader<'a> {
    /// Instantiate a new `BitReader` over the whole of the given buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        BitReader { buf, len: 8 * buf.len() as u32, pos: 0 }
    }

    /// Instantiate a new `BitReader` over the first `len` bits of the given buffer.
    pub fn with_bit_len(buf: &'a [u8], len: u32) -> Self {
        debug_assert!(len <= 8 * buf.len() as u32);
        BitReader { buf, len, pos: 0 }
    }

    /// Gets the number of bits left unread.
    #[inline(always)]
    pub fn bits_left(&self) -> u32 {
        self.len - self.pos
    }

    /// Gets the number of bits consumed so far.
    #[inline(always)]
    pub fn bits_read(&self) -> u32 {
        self.pos
    }

    /// Read a single bit as a boolean value or return an error.
    #[inline(always)]
    pub fn read_bool(&mut self) -> Result<bool> {
        if self.pos >= self.len {
            return out_of_bits_error();
        }

        let byte = self.buf[(self.pos >> 3) as usize];
        let bit = (byte >> (7 - (self.pos & 0x7))) & 1;

        self.pos += 1;
        Ok(bit != 0)
    }

    /// Read a single bit or return an error.
    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u32> {
        Ok(u32::from(self.read_bool()?))
    }

    /// Reads up to 32 bits MSB-first and returns them as an unsigned integer, or returns an
    /// error if fewer than `bit_width` bits remain.
    pub fn read_bits(&mut self, bit_width: u32) -> Result<u32> {
        debug_assert!(bit_width <= u32::BITS);

        if bit_width > self.bits_left() {
            return out_of_bits_error();
        }

        let mut bits = 0u32;
        let mut n = bit_width;

        while n > 0 {
            let byte = u32::from(self.buf[(self.pos >> 3) as usize]);

            let avail = 8 - (self.pos & 0x7);
            let take = avail.min(n);

            // The `take` bits below the top `avail` bits of the current byte. At most 8 bits are
            // consumed per iteration, so the shifts below never reach the width of `bits`.
            let chunk = (byte >> (avail - take)) & ((1 << take) - 1);

            bits = (bits << take) | chunk;

            self.pos += take;
            n -= take;
        }

        Ok(bits)
    }

    /// Ignores the specified number of bits or returns an error.
    pub fn ignore_bits(&mut self, num_bits: u32) -> Result<()> {
        if num_bits > self.bits_left() {
            return out_of_bits_error();
        }
        self.pos += num_bits;
        Ok(())
    }
}
