// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SBR extension-data block: a byte-counted container of tagged sub-payloads.

use crate::bs::BitReader;
use crate::errors::Result;
use crate::ps::bs::PsParams;

/// Extension tag carrying a Parametric Stereo payload.
pub const EXTENSION_ID_PS_CODING: u32 = 2;

/// Reads the extension-data block at the tail of an SBR element.
///
/// The block is a 4-bit byte count (escaped by a further 8 bits when all ones) followed by
/// 2-bit extension tags. A Parametric Stereo tag hands the remaining budget to the PS reader
/// and deducts what it consumed; other tags are skipped 6 bits at a time. Whatever fractional
/// bits remain of the declared byte count are consumed as padding.
pub fn extract_extended_data(
    bs: &mut BitReader<'_>,
    mut ps: Option<&mut PsParams>,
) -> Result<()> {
    // bs_extended_data
    if !bs.read_bool()? {
        return Ok(());
    }

    let mut cnt = bs.read_bits(4)?;
    if cnt == 15 {
        cnt += bs.read_bits(8)?;
    }

    let mut bits_left = 8 * cnt as i32;

    while bits_left > 7 {
        let extension_id = bs.read_bits(2)?;
        bits_left -= 2;

        match (extension_id, ps.as_deref_mut()) {
            (EXTENSION_ID_PS_CODING, Some(ps)) => {
                bits_left -= ps.read(bs, bits_left as u32)? as i32;
            }
            _ => {
                // Unknown payloads advance byte-aligned relative to the 2-bit tag.
                bs.ignore_bits(6)?;
                bits_left -= 6;
            }
        }
    }

    while bits_left > 0 {
        bs.ignore_bits(1)?;
        bits_left -= 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bs::BitReader;
    use crate::huffman::tests::{pack_bits, push_bits};

    #[test]
    fn verify_absent_extension_block() {
        let buf = pack_bits(&[false]);
        let mut bs = BitReader::new(&buf);

        extract_extended_data(&mut bs, None).unwrap();
        assert_eq!(bs.bits_read(), 1);
    }

    #[test]
    fn verify_unknown_extensions_skipped() {
        let mut bits = Vec::new();
        push_bits(&mut bits, 1, 1);
        // 2 bytes of extension data: two unknown tags and padding.
        push_bits(&mut bits, 2, 4);
        push_bits(&mut bits, 0, 2);
        push_bits(&mut bits, 0x15, 6);
        push_bits(&mut bits, 1, 2);
        push_bits(&mut bits, 0x2a, 6);
        // Trailing data past the declared count must stay unread.
        push_bits(&mut bits, 0xff, 8);
        let buf = pack_bits(&bits);

        let mut bs = BitReader::new(&buf);
        extract_extended_data(&mut bs, None).unwrap();
        assert_eq!(bs.bits_read(), 1 + 4 + 16);
    }

    #[test]
    fn verify_ps_payload_routed() {
        let mut bits = Vec::new();
        push_bits(&mut bits, 1, 1);
        push_bits(&mut bits, 1, 4);
        // PS tag, then a minimal PS frame: no header change, fixed class, zero envelopes.
        push_bits(&mut bits, EXTENSION_ID_PS_CODING as u64, 2);
        push_bits(&mut bits, 0, 1);
        push_bits(&mut bits, 0, 1);
        push_bits(&mut bits, 0, 2);
        // Padding to the declared byte.
        push_bits(&mut bits, 0, 2);
        let buf = pack_bits(&bits);

        let mut ps = PsParams::new();
        let mut bs = BitReader::new(&buf);
        extract_extended_data(&mut bs, Some(&mut ps)).unwrap();

        assert!(ps.data_available);
        assert_eq!(ps.num_env, 0);
        assert_eq!(bs.bits_read(), 1 + 4 + 8);
    }

    #[test]
    fn verify_escaped_byte_count() {
        let mut bits = Vec::new();
        push_bits(&mut bits, 1, 1);
        // Escaped count: 15 + 1 = 16 bytes, all unknown tags.
        push_bits(&mut bits, 15, 4);
        push_bits(&mut bits, 1, 8);
        for _ in 0..16 {
            push_bits(&mut bits, 0, 8);
        }
        let buf = pack_bits(&bits);

        let mut bs = BitReader::new(&buf);
        extract_extended_data(&mut bs, None).unwrap();
        assert_eq!(bs.bits_read(), 1 + 4 + 8 + 128);
    }
}
