// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Huffman codebooks for the SBR envelope and noise-floor readers.
//!
//! Each table is a binary tree of `(bit-0, bit-1)` entries: a non-negative entry is the index
//! of the next node, a negative entry is a leaf encoding the symbol `-(entry) - 64`. Decoding
//! walks from node 0, one bit per step (see [`crate::huffman::decode`]).

/// Envelope time deltas, 1.5 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_ENV_1_5DB: [(i16, i16); 120] = [
    (1, 2), (-64, -63), (3, 4), (-65, -62), (5, 6), (-66, -61), (7, 8), (-67, -60), (9, 10),
    (-68, -59), (11, 12), (-69, -58), (13, 14), (-70, -57), (15, 16), (-71, -56), (17, 18),
    (-55, -72), (19, 21), (-54, 20), (-73, -53), (22, 26), (23, 24), (-74, -52), (-51, 25),
    (-75, -50), (27, 34), (28, 29), (-76, -49), (30, 31), (-48, -77), (32, 33), (-45, -46),
    (-47, -78), (35, 57), (36, 40), (37, 38), (-40, -44), (-80, 39), (-38, -43), (41, 46),
    (42, 43), (-79, -41), (44, 45), (-39, -42), (-4, -5), (47, 50), (48, 49), (-6, -7), (-8, -9),
    (51, 54), (52, 53), (-10, -11), (-12, -13), (55, 56), (-14, -15), (-16, -17), (58, 89),
    (59, 74), (60, 67), (61, 64), (62, 63), (-18, -19), (-20, -21), (65, 66), (-22, -23),
    (-24, -25), (68, 71), (69, 70), (-26, -27), (-28, -29), (72, 73), (-30, -31), (-32, -33),
    (75, 82), (76, 79), (77, 78), (-34, -35), (-36, -37), (80, 81), (-81, -82), (-83, -84),
    (83, 86), (84, 85), (-85, -86), (-87, -88), (87, 88), (-89, -90), (-91, -92), (90, 105),
    (91, 98), (92, 95), (93, 94), (-93, -94), (-95, -96), (96, 97), (-97, -98), (-99, -100),
    (99, 102), (100, 101), (-101, -102), (-103, -104), (103, 104), (-105, -106), (-107, -108),
    (106, 113), (107, 110), (108, 109), (-109, -110), (-111, -112), (111, 112), (-113, -114),
    (-115, -116), (114, 117), (115, 116), (-117, -118), (-119, -120), (118, 119), (-121, -122),
    (-123, -124),
];
/// Envelope frequency deltas, 1.5 dB resolution.
#[rustfmt::skip]
pub const F_HUFFMAN_ENV_1_5DB: [(i16, i16); 120] = [
    (1, 2), (-64, -63), (3, 4), (-65, -62), (5, 6), (-61, -66), (7, 8), (-60, -67), (9, 10),
    (-59, -68), (11, 13), (-58, 12), (-69, -57), (14, 16), (-70, 15), (-56, -71), (17, 19),
    (-55, 18), (-72, -54), (20, 23), (21, 22), (-73, -53), (-74, -75), (24, 27), (25, 26),
    (-52, -76), (-51, -77), (28, 31), (29, 30), (-78, -50), (-49, -79), (32, 36), (33, 34),
    (-80, -81), (-48, 35), (-47, -46), (37, 47), (38, 41), (39, 40), (-45, -82), (-83, -44),
    (42, 44), (-43, 43), (-84, -85), (45, 46), (-40, -41), (-42, -38), (48, 66), (49, 56),
    (50, 53), (51, 52), (-36, -86), (-87, -89), (54, 55), (-23, -39), (-90, -91), (57, 60),
    (58, 59), (-34, -37), (-88, -92), (61, 63), (-108, 62), (-13, -18), (64, 65), (-20, -21),
    (-27, -31), (67, 89), (68, 75), (69, 72), (70, 71), (-33, -35), (-94, -101), (73, 74),
    (-106, -111), (-112, -4), (76, 82), (77, 79), (-5, 78), (-6, -7), (80, 81), (-8, -9),
    (-10, -11), (83, 86), (84, 85), (-12, -14), (-15, -16), (87, 88), (-17, -19), (-22, -24),
    (90, 105), (91, 98), (92, 95), (93, 94), (-25, -26), (-28, -29), (96, 97), (-30, -32),
    (-93, -95), (99, 102), (100, 101), (-96, -97), (-98, -99), (103, 104), (-100, -102),
    (-103, -104), (106, 113), (107, 110), (108, 109), (-105, -107), (-109, -110), (111, 112),
    (-113, -114), (-115, -116), (114, 117), (115, 116), (-117, -118), (-119, -120), (118, 119),
    (-121, -122), (-123, -124),
];
/// Envelope time deltas, balance channel, 1.5 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_ENV_BAL_1_5DB: [(i16, i16); 48] = [
    (-64, 1), (-65, 2), (-63, 3), (-66, 4), (-62, 5), (-67, 6), (-61, 7), (-68, 8), (-60, 9),
    (10, 11), (-59, -69), (12, 13), (-58, -70), (14, 28), (15, 21), (16, 18), (-71, 17),
    (-57, -72), (19, 20), (-40, -41), (-42, -43), (22, 25), (23, 24), (-44, -45), (-46, -47),
    (26, 27), (-48, -49), (-50, -51), (29, 36), (30, 33), (31, 32), (-52, -53), (-54, -55),
    (34, 35), (-56, -73), (-74, -75), (37, 41), (38, 39), (-76, -77), (-78, 40), (-79, -80),
    (42, 45), (43, 44), (-81, -82), (-83, -84), (46, 47), (-85, -86), (-87, -88),
];
/// Envelope frequency deltas, balance channel, 1.5 dB resolution.
#[rustfmt::skip]
pub const F_HUFFMAN_ENV_BAL_1_5DB: [(i16, i16); 48] = [
    (-64, 1), (-63, 2), (-65, 3), (-62, 4), (-66, 5), (-67, 6), (-61, 7), (-60, 8), (-68, 9),
    (10, 11), (-59, -69), (-58, 12), (-70, 13), (14, 17), (-57, 15), (-71, 16), (-72, -55),
    (18, 32), (19, 25), (20, 22), (-56, 21), (-40, -41), (23, 24), (-42, -43), (-44, -45),
    (26, 29), (27, 28), (-46, -47), (-48, -49), (30, 31), (-50, -51), (-52, -53), (33, 40),
    (34, 37), (35, 36), (-54, -73), (-74, -75), (38, 39), (-76, -77), (-78, -79), (41, 44),
    (42, 43), (-80, -81), (-82, -83), (45, 46), (-84, -85), (-86, 47), (-87, -88),
];
/// Envelope time deltas, 3.0 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_ENV_3_0DB: [(i16, i16); 62] = [
    (-64, 1), (-63, 2), (-65, 3), (-62, 4), (-66, 5), (-61, 6), (-67, 7), (-60, 8), (-68, 9),
    (10, 11), (-59, -69), (12, 14), (-58, 13), (-57, -70), (15, 18), (16, 17), (-56, -71),
    (-55, -54), (19, 22), (-72, 20), (-73, 21), (-74, -51), (23, 31), (24, 25), (-53, -52),
    (26, 27), (-50, -75), (28, 29), (-76, -33), (-34, 30), (-35, -36), (32, 47), (33, 40),
    (34, 37), (35, 36), (-37, -38), (-39, -40), (38, 39), (-41, -42), (-43, -44), (41, 44),
    (42, 43), (-45, -46), (-47, -48), (45, 46), (-49, -77), (-78, -79), (48, 55), (49, 52),
    (50, 51), (-80, -81), (-82, -83), (53, 54), (-84, -85), (-86, -87), (56, 59), (57, 58),
    (-88, -89), (-90, -91), (60, 61), (-92, -93), (-94, -95),
];
/// Envelope frequency deltas, 3.0 dB resolution. Also used for noise-floor frequency deltas.
#[rustfmt::skip]
pub const F_HUFFMAN_ENV_3_0DB: [(i16, i16); 62] = [
    (-64, 1), (-63, 2), (-65, 3), (-62, 4), (-66, 5), (-61, 6), (7, 8), (-67, -60), (9, 10),
    (-68, -59), (11, 12), (-69, -58), (13, 14), (-70, -57), (15, 16), (-71, -56), (17, 19),
    (-72, 18), (-73, -55), (20, 24), (21, 22), (-54, -74), (-75, 23), (-53, -52), (25, 30),
    (26, 27), (-76, -77), (28, 29), (-51, -49), (-78, -79), (31, 39), (32, 35), (33, 34),
    (-50, -82), (-46, -40), (36, 37), (-45, -80), (-81, 38), (-42, -43), (40, 47), (41, 44),
    (42, 43), (-48, -84), (-85, -86), (45, 46), (-89, -41), (-44, -88), (48, 55), (49, 52),
    (50, 51), (-33, -34), (-35, -36), (53, 54), (-37, -38), (-39, -47), (56, 59), (57, 58),
    (-83, -87), (-90, -91), (60, 61), (-92, -93), (-94, -95),
];
/// Envelope time deltas, balance channel, 3.0 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_ENV_BAL_3_0DB: [(i16, i16); 24] = [
    (-64, 1), (-65, 2), (-63, 3), (-62, 4), (-66, 5), (-67, 6), (-61, 7), (-60, 8), (-68, 9),
    (10, 16), (11, 13), (-59, 12), (-52, -53), (14, 15), (-54, -55), (-56, -57), (17, 20),
    (18, 19), (-58, -69), (-70, -71), (21, 22), (-72, -73), (-74, 23), (-75, -76),
];
/// Envelope frequency deltas, balance channel, 3.0 dB resolution. Also used for balance
/// noise-floor frequency deltas.
#[rustfmt::skip]
pub const F_HUFFMAN_ENV_BAL_3_0DB: [(i16, i16); 24] = [
    (-64, 1), (-63, 2), (-65, 3), (-62, 4), (-66, 5), (-67, 6), (-61, 7), (-60, 8), (-68, 9),
    (10, 13), (-59, 11), (-69, 12), (-70, -52), (14, 17), (15, 16), (-53, -54), (-55, -56),
    (18, 21), (19, 20), (-57, -58), (-71, -72), (22, 23), (-73, -74), (-75, -76),
];
/// Noise-floor time deltas, 3.0 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_NOISE_3_0DB: [(i16, i16); 62] = [
    (-64, 1), (-65, 2), (-63, 3), (-62, 4), (-66, 5), (-61, 6), (7, 8), (-67, -60), (9, 30),
    (10, 15), (-68, 11), (-59, 12), (13, 14), (-69, -75), (-33, -34), (16, 23), (17, 20), (18, 19),
    (-35, -36), (-37, -38), (21, 22), (-39, -40), (-41, -42), (24, 27), (25, 26), (-43, -44),
    (-45, -46), (28, 29), (-47, -48), (-49, -50), (31, 46), (32, 39), (33, 36), (34, 35),
    (-51, -52), (-53, -54), (37, 38), (-55, -56), (-57, -58), (40, 43), (41, 42), (-70, -71),
    (-72, -73), (44, 45), (-74, -76), (-77, -78), (47, 54), (48, 51), (49, 50), (-79, -80),
    (-81, -82), (52, 53), (-83, -84), (-85, -86), (55, 58), (56, 57), (-87, -88), (-89, -90),
    (59, 60), (-91, -92), (-93, 61), (-94, -95),
];
/// Noise-floor time deltas, balance channel, 3.0 dB resolution.
#[rustfmt::skip]
pub const T_HUFFMAN_NOISE_BAL_3_0DB: [(i16, i16); 24] = [
    (-64, 1), (-63, 2), (-65, 3), (4, 9), (-62, 5), (-66, 6), (7, 8), (-52, -53), (-54, -55),
    (10, 17), (11, 14), (12, 13), (-56, -57), (-58, -59), (15, 16), (-60, -61), (-67, -68),
    (18, 21), (19, 20), (-69, -70), (-71, -72), (22, 23), (-73, -74), (-75, -76),
];
