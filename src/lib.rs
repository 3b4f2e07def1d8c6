// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AAC Spectral Band Replication (SBR) and Parametric Stereo (PS) decoding.
//!
//! This crate decodes the SBR side information embedded in HE-AAC bitstreams and performs the
//! Parametric Stereo reconstruction of HE-AAC v2 streams. It is consumed by a surrounding AAC
//! core decoder: the core supplies the raw SBR payload bytes and the mono QMF-domain samples,
//! and receives decoded envelope and noise-floor parameters ([`sbr::SbrDecoder`]) and
//! reconstructed stereo QMF samples ([`ps::PsDecoder`]).
//!
//! All signal processing is 32-bit fixed point and deterministic: identical inputs produce
//! bit-identical outputs on every platform.

pub mod bs;
pub mod errors;
pub mod fixed;
pub mod ps;
pub mod sbr;

mod common;
mod huffman;

pub use errors::{Error, Result};
