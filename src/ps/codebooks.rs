// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Huffman codebooks for the PS IID and ICC parameter readers.
//!
//! Each table is a binary tree of `(bit-0, bit-1)` entries: a non-negative entry is the index
//! of the next node, a negative entry is a leaf encoding the symbol `-(entry) - 64`. Decoding
//! walks from node 0, one bit per step (see [`crate::huffman::decode`]).

/// IID index deltas along time, default (7-step) quantisation.
#[rustfmt::skip]
pub const HUFF_IID_DEFAULT_TIME: [(i16, i16); 28] = [
    (-64, 1), (-63, 2), (-65, 3), (-62, 4), (-66, 5), (-61, 6), (-67, 7), (-60, 8), (-68, 9),
    (-59, 10), (-69, 11), (-58, 12), (-70, 13), (-71, 14), (-57, 15), (16, 17), (-72, -56),
    (18, 21), (19, 20), (-73, -50), (-51, -52), (22, 25), (23, 24), (-53, -54), (-55, -74),
    (26, 27), (-75, -76), (-77, -78),
];
/// IID index deltas along frequency, default (7-step) quantisation.
#[rustfmt::skip]
pub const HUFF_IID_DEFAULT_FREQ: [(i16, i16); 28] = [
    (-64, 1), (2, 3), (-65, -63), (4, 5), (-66, -62), (6, 7), (-67, -61), (8, 9), (-60, -68),
    (-69, 10), (-59, 11), (-70, 12), (-58, 13), (-57, 14), (-71, 15), (16, 17), (-72, -56),
    (18, 19), (-73, -74), (20, 21), (-55, -75), (22, 24), (-54, 23), (-53, -50), (25, 26),
    (-51, -52), (-76, 27), (-77, -78),
];
/// IID index deltas along time, fine (15-step) quantisation.
#[rustfmt::skip]
pub const HUFF_IID_FINE_TIME: [(i16, i16); 60] = [
    (1, -64), (-65, 2), (3, -63), (4, 59), (5, 7), (6, -61), (-60, -68), (-67, 8), (9, 11),
    (-69, 10), (-58, -70), (12, 41), (13, 20), (14, -57), (-73, 15), (-75, 16), (17, -51),
    (18, 19), (-43, -44), (-82, -83), (-71, 21), (22, 40), (23, 29), (-77, 24), (25, 26),
    (-45, -46), (27, 28), (-38, -90), (-36, -37), (30, 37), (31, 34), (32, 33), (-93, -94),
    (-91, -92), (35, 36), (-34, -35), (-39, -89), (38, -49), (39, -47), (-40, -88), (-54, -74),
    (42, -59), (43, 44), (-56, -72), (45, 52), (46, 50), (47, -52), (-79, 48), (-81, 49),
    (-41, -87), (-76, 51), (-50, -78), (53, -55), (54, -53), (55, 57), (56, -48), (-42, -86),
    (-80, 58), (-84, -85), (-62, -66),
];
/// IID index deltas along frequency, fine (15-step) quantisation.
#[rustfmt::skip]
pub const HUFF_IID_FINE_FREQ: [(i16, i16); 60] = [
    (1, -64), (2, 4), (3, -63), (-62, -66), (-65, 5), (6, 7), (-61, -67), (8, 9), (-60, -68),
    (10, 11), (-59, -69), (12, 13), (-58, -70), (14, 18), (-71, 15), (16, -56), (-74, 17),
    (-53, -75), (19, 37), (-72, 20), (21, -55), (22, 29), (23, -52), (24, -50), (25, 28), (26, 27),
    (-43, -85), (-45, -83), (-47, -81), (-76, 30), (-78, 31), (32, -49), (33, 34), (-46, -82),
    (35, 36), (-38, -39), (-36, -37), (38, -57), (-73, 39), (40, -54), (41, 50), (42, -51),
    (-79, 43), (44, 47), (45, 46), (-42, -86), (-40, -41), (48, 49), (-89, -90), (-87, -88),
    (-77, 51), (52, 59), (53, 56), (54, 55), (-93, -94), (-91, -92), (57, 58), (-34, -35),
    (-44, -84), (-48, -80),
];
/// ICC index deltas along time.
#[rustfmt::skip]
pub const HUFF_ICC_TIME: [(i16, i16); 14] = [
    (-64, 1), (-65, 2), (-63, 3), (-66, 4), (-62, 5), (-67, 6), (-61, 7), (-68, 8), (-60, 9),
    (-69, 10), (-59, 11), (-70, 12), (-58, 13), (-57, -71),
];
/// ICC index deltas along frequency.
#[rustfmt::skip]
pub const HUFF_ICC_FREQ: [(i16, i16); 14] = [
    (-64, 1), (-65, 2), (-63, 3), (-66, 4), (-62, 5), (-67, 6), (-61, 7), (-68, 8), (-69, 9),
    (-60, 10), (-70, 11), (-59, 12), (-71, 13), (-58, -57),
];
