// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embedding engines.
//!
//! Four peer variants behind one tagged union, [`Engine`]:
//!
//! - **LSB**: spatial low-bit replacement, configurable depth and channels.
//! - **DCT**: quantization parity of six mid-frequency coefficients per
//!   8×8 block and color channel.
//! - **DWT**: quantization parity of the Haar high-high subband.
//! - **PVD**: pixel-value differencing over horizontal pairs, content
//!   dependent capacity.
//!
//! Every engine offers the same three operations: `capacity`, `embed`
//! (fails with `CapacityExceeded` before touching a pixel) and `extract`
//! (returns at most `max_bits`, in exactly the order `embed` consumed them).

pub mod dct;
pub mod dwt;
pub mod lsb;
pub mod pvd;

use crate::raster::PixelBuffer;
use crate::stego::error::StegoError;
use crate::stego::options::Algorithm;

pub use lsb::LsbParams;

/// A configured embedding engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    Lsb(LsbParams),
    Dct,
    Dwt,
    Pvd,
}

impl Engine {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Engine::Lsb(_) => Algorithm::Lsb,
            Engine::Dct => Algorithm::Dct,
            Engine::Dwt => Algorithm::Dwt,
            Engine::Pvd => Algorithm::Pvd,
        }
    }

    /// Dimensions of the stego raster produced from a `width × height` cover.
    pub fn output_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32), StegoError> {
        match self {
            Engine::Dct => dct::cropped_dimensions(width, height),
            _ => Ok((width, height)),
        }
    }

    /// Payload bits `pixels` can carry.
    pub fn capacity(&self, pixels: &PixelBuffer) -> Result<usize, StegoError> {
        match self {
            Engine::Lsb(params) => Ok(lsb::capacity(pixels.width(), pixels.height(), params)),
            Engine::Dct => dct::capacity(pixels.width(), pixels.height()),
            Engine::Dwt => dwt::capacity(pixels.width(), pixels.height()),
            Engine::Pvd => pvd::capacity(pixels),
        }
    }

    /// Embed `bits` into `cover`, consuming it.
    pub fn embed(&self, cover: PixelBuffer, bits: &[u8]) -> Result<PixelBuffer, StegoError> {
        match self {
            Engine::Lsb(params) => lsb::embed(cover, bits, params),
            Engine::Dct => dct::embed(cover, bits),
            Engine::Dwt => dwt::embed(cover, bits),
            Engine::Pvd => pvd::embed(cover, bits),
        }
    }

    /// Read up to `max_bits` bits back out of `stego`.
    pub fn extract(&self, stego: &PixelBuffer, max_bits: usize) -> Result<Vec<u8>, StegoError> {
        match self {
            Engine::Lsb(params) => Ok(lsb::extract(stego, max_bits, params)),
            Engine::Dct => dct::extract(stego, max_bits),
            Engine::Dwt => dwt::extract(stego, max_bits),
            Engine::Pvd => pvd::extract(stego, max_bits),
        }
    }
}

// --- Quantization-parity helpers shared by DCT and DWT ---

/// Quantized level of `value` (round half away from zero).
#[inline]
pub(crate) fn quant_level(value: f64, step: f64) -> i64 {
    (value / step).round() as i64
}

/// Bit encoded by the parity of `value`'s quantized level.
#[inline]
pub(crate) fn parity_bit(value: f64, step: f64) -> u8 {
    quant_level(value, step).rem_euclid(2) as u8
}

/// The level nearest to `value` whose parity encodes `bit`.
///
/// If the current level already has the right parity it is kept. Otherwise
/// the level one step toward `value` wins; an exact hit on a level moves
/// away from zero so the coefficient keeps its sign.
pub(crate) fn parity_level(value: f64, step: f64, bit: u8) -> i64 {
    let scaled = value / step;
    let q = scaled.round() as i64;
    if q.rem_euclid(2) as u8 == bit & 1 {
        return q;
    }
    let up = if scaled != q as f64 {
        scaled > q as f64
    } else if q != 0 {
        q > 0
    } else {
        value >= 0.0
    };
    if up {
        q + 1
    } else {
        q - 1
    }
}

/// Clamp and round a reconstructed sample.
#[inline]
pub(crate) fn to_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
