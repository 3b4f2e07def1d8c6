// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `huffman` module provides the binary-tree codeword decoder shared by the SBR envelope,
//! SBR noise-floor, and PS parameter readers.

use crate::bs::BitReader;
use crate::errors::Result;

/// The leaf offset of the tree tables: a negative entry `e` is a leaf encoding the symbol
/// `-e - 64`, so the all-zero delta sits at entry -64 and the symbol range is symmetric
/// around it.
const LEAF_OFFSET: i32 = 64;

/// A Huffman codebook represented as a binary tree.
///
/// Each node is a pair of entries, one per branch (bit 0 selects the first, bit 1 the second).
/// A non-negative entry is the index of the next node; a negative entry is a leaf (see
/// [`LEAF_OFFSET`]). Decoding starts at node 0 and consumes one bit per step.
pub type HuffmanTree = [(i16, i16)];

/// Reads one codeword from the bitstream and returns the decoded symbol.
pub fn decode(bs: &mut BitReader<'_>, tree: &HuffmanTree) -> Result<i32> {
    let mut node = tree[0];

    loop {
        let entry = i32::from(if bs.read_bool()? { node.1 } else { node.0 });

        if entry < 0 {
            return Ok(-entry - LEAF_OFFSET);
        }

        node = tree[entry as usize];
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bs::BitReader;

    /// Finds the codeword of `symbol` in `tree` by depth-first search. Test helper for
    /// exercising the readers with synthetic bitstreams.
    pub fn encode(tree: &HuffmanTree, symbol: i32) -> Option<(u64, u32)> {
        fn walk(
            tree: &HuffmanTree,
            node: usize,
            symbol: i32,
            code: u64,
            len: u32,
        ) -> Option<(u64, u32)> {
            let (b0, b1) = (i32::from(tree[node].0), i32::from(tree[node].1));

            for (bit, entry) in [(0u64, b0), (1u64, b1)] {
                let code = (code << 1) | bit;
                if entry < 0 {
                    if -entry - LEAF_OFFSET == symbol {
                        return Some((code, len + 1));
                    }
                }
                else if let Some(hit) = walk(tree, entry as usize, symbol, code, len + 1) {
                    return Some(hit);
                }
            }
            None
        }

        walk(tree, 0, symbol, 0, 0)
    }

    /// Appends `len` bits of `code` MSB-first to a bit vector. Test helper.
    pub fn push_bits(bits: &mut Vec<bool>, code: u64, len: u32) {
        for i in (0..len).rev() {
            bits.push((code >> i) & 1 != 0);
        }
    }

    /// Packs a bit vector into bytes, zero-padding the tail. Test helper.
    pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
        let mut buf = vec![0u8; (bits.len() + 7) / 8];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                buf[i / 8] |= 0x80 >> (i % 8);
            }
        }
        buf
    }

    const TINY: [(i16, i16); 2] = [(-64, 1), (-65, -63)];

    #[test]
    fn verify_decode_walks_tree() {
        // Codes in TINY: 0 -> symbol 0, 10 -> symbol 1, 11 -> symbol -1.
        let mut bs = BitReader::new(&[0b0_10_11_0_00]);

        assert_eq!(decode(&mut bs, &TINY).unwrap(), 0);
        assert_eq!(decode(&mut bs, &TINY).unwrap(), 1);
        assert_eq!(decode(&mut bs, &TINY).unwrap(), -1);
        assert_eq!(decode(&mut bs, &TINY).unwrap(), 0);
    }

    #[test]
    fn verify_encode_inverts_decode() {
        for symbol in [-1, 0, 1] {
            let (code, len) = encode(&TINY, symbol).unwrap();

            let mut bits = Vec::new();
            push_bits(&mut bits, code, len);
            let buf = pack_bits(&bits);

            let mut bs = BitReader::new(&buf);
            assert_eq!(decode(&mut bs, &TINY).unwrap(), symbol);
        }
    }

    #[test]
    fn verify_decode_out_of_bits() {
        let mut bs = BitReader::with_bit_len(&[0b1000_0000], 1);
        // One bit is not enough to reach a leaf along the `1` branch.
        assert!(decode(&mut bs, &TINY).is_err());
    }
}
