// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Steganographic encoding and decoding of raw rasters.
//!
//! A payload is wrapped in a self-describing envelope (magic, flags, length,
//! SHA-256 digest, optional AES-256-GCM-SIV parameters), turned into a bit
//! stream and handed to one of four engines:
//!
//! - **LSB**: low-bit replacement, highest capacity, fragile.
//! - **DCT**: parity of mid-frequency 8×8 block coefficients.
//! - **DWT**: parity of the Haar high-high subband.
//! - **PVD**: pixel-value differencing, capacity follows image texture.
//!
//! [`encode`] and [`decode`] are the entry points; [`capacity`] reports how
//! much fits before trying.

pub mod bits;
pub mod capacity;
pub mod crypto;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod options;
mod pipeline;

pub use capacity::{capacity, CapacityInfo};
pub use engine::Engine;
pub use error::StegoError;
pub use options::{Algorithm, StegoOptions};
pub use pipeline::{decode, encode, DecodeOutput, EncodeMetrics, EncodeOutput, Stage};

/// Smallest cover (width, height) `algorithm` accepts.
///
/// DCT needs one full 8×8 block, DWT one 2×2 tile, PVD one horizontal pair.
pub const fn min_dimensions(algorithm: Algorithm) -> (u32, u32) {
    match algorithm {
        Algorithm::Lsb => (1, 1),
        Algorithm::Dct => (engine::dct::BLOCK as u32, engine::dct::BLOCK as u32),
        Algorithm::Dwt => (2, 2),
        Algorithm::Pvd => (2, 1),
    }
}
