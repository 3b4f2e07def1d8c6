// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction of the SBR time/frequency grid from the frame-class element.

use crate::bs::BitReader;
use crate::common::*;
use crate::errors::Result;

/// The four envelope-border layouts of an SBR frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameClass {
    /// Fixed leading and trailing borders, evenly spaced envelopes.
    FixFix,
    /// Fixed leading border, variable trailing border.
    FixVar,
    /// Variable leading border, fixed trailing border.
    VarFix,
    /// Variable leading and trailing borders.
    VarVar,
}

/// The per-frame time/frequency grid: envelope borders, per-envelope frequency resolution,
/// transient position, and the derived noise-floor borders.
///
/// Recomputed from the bitstream every frame; it never persists across frames except as the
/// shape of that frame's envelope and noise arrays.
#[derive(Clone, Debug)]
pub struct FrameInfo {
    pub frame_class: FrameClass,
    pub num_env: usize,
    /// Envelope time borders `t_e[0..=num_env]`, in 1/16th-frame units.
    pub borders: [i32; MAX_ENVELOPES + 1],
    /// Per-envelope frequency resolution: 0 = low, 1 = high.
    pub freq_res: [u8; MAX_ENVELOPES],
    /// Index of the transient envelope, or -1 when no transient is signalled.
    pub transient_env: i32,
    pub num_noise_env: usize,
    /// Noise-floor time borders `t_q[0..=num_noise_env]`.
    pub noise_borders: [i32; MAX_NOISE_ENVELOPES + 1],
}

impl Default for FrameInfo {
    fn default() -> Self {
        // A single full-length envelope with one noise floor.
        FrameInfo {
            frame_class: FrameClass::FixFix,
            num_env: 1,
            borders: [0, SBR_TIME_SLOTS, 0, 0, 0, 0],
            freq_res: [1; MAX_ENVELOPES],
            transient_env: -1,
            num_noise_env: 1,
            noise_borders: [0, SBR_TIME_SLOTS, 0],
        }
    }
}

/// Width of the transient-pointer field, indexed by envelope count. The pointer addresses one
/// of `num_env + 2` positions.
const BS_POINTER_BITS_TBL: [u32; 6] = [0, 2, 2, 3, 3, 3];

/// Average envelope spacing `16 / num_env` in Q12, indexed by envelope count.
const T_16_OV_BS_NUM_ENV_TBL: [i32; 6] = [0, 65536, 32768, 21845, 16384, 13107];

/// Reads the frame-class element and derives the frame's time/frequency grid.
///
/// On success the returned grid satisfies: borders non-decreasing, `t_e[0]` equals the absolute
/// leading border, `t_e[num_env]` the trailing border (16, or 16 plus the variable offset).
///
/// Returns a decode error when the signalled borders decrease, the leading border overruns the
/// trailing one, or the envelope count exceeds [`MAX_ENVELOPES`].
pub fn extract_frame_info(bs: &mut BitReader<'_>) -> Result<FrameInfo> {
    let mut info = FrameInfo::default();

    // The transient pointer, counted as in the bitstream; its meaning is class specific.
    let pointer;

    match bs.read_bits(2)? {
        0 => {
            info.frame_class = FrameClass::FixFix;

            let num_env = 1usize << bs.read_bits(2)?;
            validate!(num_env <= MAX_ENVELOPES);
            info.num_env = num_env;

            let f = bs.read_bits(1)? as u8;
            info.freq_res = [f; MAX_ENVELOPES];

            // Evenly spaced borders via the average-spacing table, rounded to slot units.
            for i in 0..=num_env {
                let t = (i as i32) * T_16_OV_BS_NUM_ENV_TBL[num_env] + (1 << 11);
                info.borders[i] = t >> 12;
            }

            pointer = 0;
            info.transient_env = -1;
        }
        1 => {
            info.frame_class = FrameClass::FixVar;

            let abs_bord_trail = SBR_TIME_SLOTS + bs.read_bits(2)? as i32;
            let num_rel = bs.read_bits(2)? as usize;
            let num_env = num_rel + 1;
            info.num_env = num_env;

            info.borders[num_env] = abs_bord_trail;
            for i in 0..num_rel {
                let rel = 2 * bs.read_bits(2)? as i32 + 2;
                info.borders[num_env - 1 - i] = info.borders[num_env - i] - rel;
            }
            info.borders[0] = 0;

            validate!(info.borders[1] >= 0);

            pointer = bs.read_bits(BS_POINTER_BITS_TBL[num_env])?;
            validate!((pointer as usize) < num_env + 2);

            // Frequency resolution flags are transmitted trailing-envelope first.
            for i in 0..num_env {
                info.freq_res[num_env - 1 - i] = bs.read_bits(1)? as u8;
            }

            info.transient_env =
                if pointer == 0 { -1 } else { (num_env + 1) as i32 - pointer as i32 };
        }
        2 => {
            info.frame_class = FrameClass::VarFix;

            let abs_bord_lead = bs.read_bits(2)? as i32;
            let num_rel = bs.read_bits(2)? as usize;
            let num_env = num_rel + 1;
            info.num_env = num_env;

            info.borders[0] = abs_bord_lead;
            for i in 0..num_rel {
                let rel = 2 * bs.read_bits(2)? as i32 + 2;
                info.borders[i + 1] = info.borders[i] + rel;
            }
            info.borders[num_env] = SBR_TIME_SLOTS;

            validate!(info.borders[num_env - 1] <= SBR_TIME_SLOTS);

            pointer = bs.read_bits(BS_POINTER_BITS_TBL[num_env])?;
            validate!((pointer as usize) < num_env + 2);

            for i in 0..num_env {
                info.freq_res[i] = bs.read_bits(1)? as u8;
            }

            info.transient_env = if pointer > 1 { pointer as i32 - 1 } else { -1 };
        }
        _ => {
            info.frame_class = FrameClass::VarVar;

            let abs_bord_lead = bs.read_bits(2)? as i32;
            let abs_bord_trail = SBR_TIME_SLOTS + bs.read_bits(2)? as i32;
            let num_rel_lead = bs.read_bits(2)? as usize;
            let num_rel_trail = bs.read_bits(2)? as usize;

            let num_env = num_rel_lead + num_rel_trail + 1;
            validate!(num_env <= MAX_ENVELOPES);
            info.num_env = num_env;

            info.borders[0] = abs_bord_lead;
            for i in 0..num_rel_lead {
                let rel = 2 * bs.read_bits(2)? as i32 + 2;
                info.borders[i + 1] = info.borders[i] + rel;
            }

            info.borders[num_env] = abs_bord_trail;
            for i in 0..num_rel_trail {
                let rel = 2 * bs.read_bits(2)? as i32 + 2;
                info.borders[num_env - 1 - i] = info.borders[num_env - i] - rel;
            }

            pointer = bs.read_bits(BS_POINTER_BITS_TBL[num_env])?;
            validate!((pointer as usize) < num_env + 2);

            for i in 0..num_env {
                info.freq_res[i] = bs.read_bits(1)? as u8;
            }

            info.transient_env =
                if pointer == 0 { -1 } else { (num_env + 1) as i32 - pointer as i32 };
        }
    }

    // The grid is a protocol violation if the borders do not advance monotonically between the
    // absolute leading and trailing anchors.
    validate!(info.borders[0] >= 0);
    for i in 0..info.num_env {
        validate!(info.borders[i] <= info.borders[i + 1]);
    }

    // The 1-2 noise-floor borders derive from the envelope borders: a single noise floor spans
    // the frame, two noise floors split at the class-specific middle border.
    info.num_noise_env = if info.num_env == 1 { 1 } else { 2 };

    info.noise_borders[0] = info.borders[0];
    if info.num_noise_env == 1 {
        info.noise_borders[1] = info.borders[info.num_env];
    }
    else {
        let middle = middle_border(info.frame_class, info.num_env, pointer);
        info.noise_borders[1] = info.borders[middle];
        info.noise_borders[2] = info.borders[info.num_env];
    }

    Ok(info)
}

/// The envelope index at which the second noise floor starts.
fn middle_border(frame_class: FrameClass, num_env: usize, pointer: u32) -> usize {
    let pointer = pointer as usize;

    match frame_class {
        FrameClass::FixFix => num_env / 2,
        FrameClass::VarFix => {
            if pointer == 0 {
                1
            }
            else if pointer == 1 {
                num_env - 1
            }
            else {
                pointer - 1
            }
        }
        FrameClass::FixVar | FrameClass::VarVar => {
            if pointer > 1 {
                num_env + 1 - pointer
            }
            else {
                num_env - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bs::BitReader;

    fn bits(groups: &[(u64, u32)]) -> Vec<u8> {
        let mut v = Vec::new();
        for &(code, len) in groups {
            crate::huffman::tests::push_bits(&mut v, code, len);
        }
        crate::huffman::tests::pack_bits(&v)
    }

    #[test]
    fn verify_fixfix_borders() {
        for (sel, num_env) in [(0u64, 1usize), (1, 2), (2, 4)] {
            // class=0, 2-bit count selector, 1-bit freq res.
            let buf = bits(&[(0, 2), (sel, 2), (1, 1)]);
            let mut bs = BitReader::new(&buf);
            let info = extract_frame_info(&mut bs).unwrap();

            assert_eq!(info.frame_class, FrameClass::FixFix);
            assert_eq!(info.num_env, num_env);
            assert_eq!(info.borders[0], 0);
            assert_eq!(info.borders[num_env], 16);
            for i in 0..num_env {
                assert_eq!(info.borders[i + 1] - info.borders[i], 16 / num_env as i32);
                assert_eq!(info.freq_res[i], 1);
            }
        }
    }

    #[test]
    fn verify_fixfix_rejects_eight_envelopes() {
        let buf = bits(&[(0, 2), (3, 2), (0, 1)]);
        let mut bs = BitReader::new(&buf);
        assert!(extract_frame_info(&mut bs).is_err());
    }

    #[test]
    fn verify_fixvar_walks_borders_backwards() {
        // class=1, var_bord=2 (trail=18), num_rel=2 (3 envelopes), rel = {2*1+2, 2*0+2},
        // pointer (3 bits, table entry for 3 envelopes) = 0, freq res 3 bits (reverse order).
        let buf = bits(&[(1, 2), (2, 2), (2, 2), (1, 2), (0, 2), (0, 3), (0b110, 3)]);
        let mut bs = BitReader::new(&buf);
        let info = extract_frame_info(&mut bs).unwrap();

        assert_eq!(info.frame_class, FrameClass::FixVar);
        assert_eq!(info.num_env, 3);
        assert_eq!(info.borders[..4], [0, 12, 14, 18]);
        // Transmitted trailing first: envelopes 2,1,0 get 1,1,0.
        assert_eq!(info.freq_res[..3], [0, 1, 1]);
        assert_eq!(info.transient_env, -1);
        // Two noise floors, split at the default middle border (num_env - 1).
        assert_eq!(info.num_noise_env, 2);
        assert_eq!(info.noise_borders[..3], [0, 14, 18]);
    }

    #[test]
    fn verify_varfix_walks_borders_forwards() {
        // class=2, lead=2, num_rel=2 (3 envelopes), rel = {2*1+2, 2*0+2}, pointer=2
        // (3 bits for 3 envelopes), freq res 3 bits in forward order.
        let buf = bits(&[(2, 2), (2, 2), (2, 2), (1, 2), (0, 2), (2, 3), (0b011, 3)]);
        let mut bs = BitReader::new(&buf);
        let info = extract_frame_info(&mut bs).unwrap();

        assert_eq!(info.frame_class, FrameClass::VarFix);
        assert_eq!(info.num_env, 3);
        // The leading border is variable, the trailing border pinned to the frame end.
        assert_eq!(info.borders[..4], [2, 6, 8, 16]);
        assert_eq!(info.freq_res[..3], [0, 1, 1]);
        // pointer=2 -> transient envelope pointer - 1 = 1.
        assert_eq!(info.transient_env, 1);
        // Two noise floors, split at envelope pointer - 1.
        assert_eq!(info.num_noise_env, 2);
        assert_eq!(info.noise_borders[..3], [2, 6, 16]);
    }

    #[test]
    fn verify_varfix_rejects_overrunning_lead_borders() {
        // class=2, lead=3, num_rel=3, rel all 2*3+2=8: borders 3,11,19 > 16.
        let buf = bits(&[(2, 2), (3, 2), (3, 2), (3, 2), (3, 2), (3, 2), (0, 3), (0, 4)]);
        let mut bs = BitReader::new(&buf);
        assert!(extract_frame_info(&mut bs).is_err());
    }

    #[test]
    fn verify_varvar_meets_in_middle() {
        // class=3, lead=1, trail=16+1, one leading rel (2*2+2=6), one trailing rel (2*1+2=4),
        // pointer=2 (3 envelopes -> 3 bits), freq res = 101.
        let buf =
            bits(&[(3, 2), (1, 2), (1, 2), (1, 2), (1, 2), (2, 2), (1, 2), (2, 3), (0b101, 3)]);
        let mut bs = BitReader::new(&buf);
        let info = extract_frame_info(&mut bs).unwrap();

        assert_eq!(info.num_env, 3);
        assert_eq!(info.borders[..4], [1, 7, 13, 17]);
        assert_eq!(info.freq_res[..3], [1, 0, 1]);
        // pointer=2 -> transient envelope num_env + 1 - 2 = 2.
        assert_eq!(info.transient_env, 2);
        // middle border = num_env + 1 - pointer = 2.
        assert_eq!(info.noise_borders[..3], [1, 13, 17]);
    }

    #[test]
    fn verify_varvar_rejects_crossed_borders() {
        // Leading walk reaches 13, trailing walk pulls the middle border to 8: crossed.
        let buf =
            bits(&[(3, 2), (1, 2), (0, 2), (2, 2), (1, 2), (2, 2), (2, 2), (3, 2), (0, 3), (0, 4)]);
        let mut bs = BitReader::new(&buf);
        assert!(extract_frame_info(&mut bs).is_err());
    }
}
