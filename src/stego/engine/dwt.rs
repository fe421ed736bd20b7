// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Single-level Haar wavelet embedding.
//!
//! Each color channel is split into 2×2 tiles; the orthonormal Haar
//! transform of a tile yields one coefficient in each of the LL, LH, HL and
//! HH subbands. One bit rides on the quantization parity of every HH
//! coefficient (step [`QUANT_STEP`]); the tile is transformed back, rounded
//! and clamped. An odd trailing row or column is left untouched.
//!
//! Traversal: channel, subband row, subband column.

use tracing::warn;

use super::{parity_bit, parity_level, to_sample};
use crate::raster::PixelBuffer;
use crate::stego::error::StegoError;

/// Quantization step for HH parity.
pub const QUANT_STEP: f64 = 8.0;

const COLOR_CHANNELS: usize = 3;

/// Re-analysis passes per tile before giving up on clamped samples.
const MAX_REFINE_PASSES: usize = 4;

/// Haar coefficients of one 2×2 tile `[a b; c d]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaarTile {
    pub ll: f64,
    pub lh: f64,
    pub hl: f64,
    pub hh: f64,
}

impl HaarTile {
    pub fn forward([a, b, c, d]: [f64; 4]) -> Self {
        Self {
            ll: (a + b + c + d) / 2.0,
            lh: (a - b + c - d) / 2.0,
            hl: (a + b - c - d) / 2.0,
            hh: (a - b - c + d) / 2.0,
        }
    }

    pub fn inverse(&self) -> [f64; 4] {
        let Self { ll, lh, hl, hh } = *self;
        [
            (ll + lh + hl + hh) / 2.0,
            (ll - lh + hl - hh) / 2.0,
            (ll + lh - hl - hh) / 2.0,
            (ll - lh - hl + hh) / 2.0,
        ]
    }
}

/// Subband dimensions (half the image, rounded down).
fn subband_dimensions(width: u32, height: u32) -> Result<(usize, usize), StegoError> {
    if width < 2 || height < 2 {
        return Err(StegoError::dimensions(width, height, "DWT needs at least a 2x2 image"));
    }
    Ok((width as usize / 2, height as usize / 2))
}

/// `(width/2) × (height/2) × 3`.
pub fn capacity(width: u32, height: u32) -> Result<usize, StegoError> {
    let (sw, sh) = subband_dimensions(width, height)?;
    Ok(sw * sh * COLOR_CHANNELS)
}

/// Sample indices of the tile at subband coordinate (sx, sy).
fn tile_indices(pixels: &PixelBuffer, sx: usize, sy: usize, ch: usize) -> [usize; 4] {
    let (x, y) = (2 * sx, 2 * sy);
    [
        pixels.index(x, y, ch),
        pixels.index(x + 1, y, ch),
        pixels.index(x, y + 1, ch),
        pixels.index(x + 1, y + 1, ch),
    ]
}

fn load_tile(raw: &[u8], idx: &[usize; 4]) -> [f64; 4] {
    idx.map(|i| f64::from(raw[i]))
}

/// Embed one bit into a tile. Returns `false` if clamping kept HH off its parity.
fn embed_tile(raw: &mut [u8], idx: &[usize; 4], bit: u8) -> bool {
    let mut drive = HaarTile::forward(load_tile(raw, idx));
    let target = parity_level(drive.hh, QUANT_STEP, bit) as f64 * QUANT_STEP;
    drive.hh = target;

    for _ in 0..MAX_REFINE_PASSES {
        for (&i, v) in idx.iter().zip(drive.inverse()) {
            raw[i] = to_sample(v);
        }
        let actual = HaarTile::forward(load_tile(raw, idx)).hh;
        if parity_bit(actual, QUANT_STEP) == bit {
            return true;
        }
        drive.hh += target - actual;
    }
    false
}

pub fn embed(mut cover: PixelBuffer, bits: &[u8]) -> Result<PixelBuffer, StegoError> {
    let (sw, sh) = subband_dimensions(cover.width(), cover.height())?;
    let cap = sw * sh * COLOR_CHANNELS;
    if bits.len() > cap {
        return Err(StegoError::CapacityExceeded { required_bits: bits.len() as u64, capacity_bits: cap });
    }

    let per_channel = sw * sh;
    let mut unsettled = 0usize;
    for (i, &bit) in bits.iter().enumerate() {
        let ch = i / per_channel;
        let (sy, sx) = ((i % per_channel) / sw, i % sw);
        let idx = tile_indices(&cover, sx, sy, ch);
        if !embed_tile(cover.as_raw_mut(), &idx, bit) {
            unsettled += 1;
        }
    }

    if unsettled > 0 {
        warn!(unsettled, "DWT tiles clamped off their target parity");
    }
    Ok(cover)
}

pub fn extract(stego: &PixelBuffer, max_bits: usize) -> Result<Vec<u8>, StegoError> {
    let (sw, sh) = subband_dimensions(stego.width(), stego.height())?;
    let per_channel = sw * sh;
    let want = max_bits.min(per_channel * COLOR_CHANNELS);
    let raw = stego.as_raw();

    let bits = (0..want)
        .map(|i| {
            let ch = i / per_channel;
            let (sy, sx) = ((i % per_channel) / sw, i % sw);
            let idx = tile_indices(stego, sx, sy, ch);
            parity_bit(HaarTile::forward(load_tile(raw, &idx)).hh, QUANT_STEP)
        })
        .collect();
    Ok(bits)
}
