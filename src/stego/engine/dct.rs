// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block-DCT quantization-parity embedding.
//!
//! The cover is cropped to a multiple of 8 in both directions and reduced to
//! RGB. Each 8×8 block of each color channel goes through an orthonormal
//! type-II DCT; one bit is carried by the parity of each of six mid-frequency
//! coefficients quantized with [`QUANT_STEP`]. The block is transformed back,
//! rounded and clamped to 0–255.
//!
//! Traversal: block row, block column, channel, then [`COEFF_POSITIONS`] in
//! order, so every block carries exactly [`BITS_PER_BLOCK`] bits and the bit
//! range of a block row is known up front. With the `parallel` feature, block
//! rows are processed on the rayon pool.
//!
//! Rounding to integer samples moves a coefficient by a few units at most,
//! well inside half a quantization step. Clamping near black or white can
//! move it further, so every unit is re-analysed after writing and the
//! shortfall of any coefficient that lost its parity is fed back into the
//! next inverse transform.

use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::warn;

use super::{parity_bit, parity_level, to_sample};
use crate::raster::PixelBuffer;
use crate::stego::error::StegoError;

/// Block edge length.
pub const BLOCK: usize = 8;

/// Embedding coefficients as (vertical, horizontal) frequency.
pub const COEFF_POSITIONS: [(usize, usize); 6] = [(1, 4), (2, 3), (3, 2), (4, 1), (2, 4), (4, 2)];

/// Quantization step for coefficient parity.
pub const QUANT_STEP: f64 = 25.0;

/// Color channels carrying data.
const COLOR_CHANNELS: usize = 3;

/// Bits carried by one 8×8 block (six coefficients × three channels).
pub const BITS_PER_BLOCK: usize = COEFF_POSITIONS.len() * COLOR_CHANNELS;

/// Re-analysis passes per unit before giving up on clamped samples.
const MAX_REFINE_PASSES: usize = 6;

/// `COSINE[u][x] = cos((2x + 1) · u · π / 16)`
static COSINE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; 8]; 8] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, entry) in row.iter_mut().enumerate() {
                *entry = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

/// C(0) = 1/√8, C(u>0) = 1/2.
#[inline]
fn norm(u: usize) -> f64 {
    if u == 0 {
        std::f64::consts::FRAC_1_SQRT_2 * 0.5
    } else {
        0.5
    }
}

/// Level-shifted 8×8 forward DCT-II. Output index is `u * 8 + v`.
pub fn forward_dct(pixels: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();

    // Rows: temp[y][v]
    let mut temp = [0.0f64; 64];
    for y in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;
            for x in 0..8 {
                sum += (pixels[y * 8 + x] - 128.0) * cos[v][x];
            }
            temp[y * 8 + v] = norm(v) * sum;
        }
    }

    // Columns: out[u][v]
    let mut out = [0.0f64; 64];
    for v in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                sum += temp[y * 8 + v] * cos[u][y];
            }
            out[u * 8 + v] = norm(u) * sum;
        }
    }
    out
}

/// Inverse of [`forward_dct`], including the +128 level shift.
pub fn inverse_dct(coeffs: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();

    // Rows of the coefficient matrix: temp[u][x]
    let mut temp = [0.0f64; 64];
    for u in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for v in 0..8 {
                sum += norm(v) * coeffs[u * 8 + v] * cos[v][x];
            }
            temp[u * 8 + x] = sum;
        }
    }

    let mut pixels = [0.0f64; 64];
    for x in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += norm(u) * temp[u * 8 + x] * cos[u][y];
            }
            pixels[y * 8 + x] = sum + 128.0;
        }
    }
    pixels
}

/// Dimensions after cropping to whole blocks.
///
/// # Errors
/// [`StegoError::InvalidDimensions`] if the image is smaller than one block.
pub fn cropped_dimensions(width: u32, height: u32) -> Result<(u32, u32), StegoError> {
    let block = BLOCK as u32;
    if width < block || height < block {
        return Err(StegoError::dimensions(width, height, "DCT needs at least one 8x8 block"));
    }
    Ok((width - width % block, height - height % block))
}

/// `blocks × 6 coefficients × 3 channels`.
pub fn capacity(width: u32, height: u32) -> Result<usize, StegoError> {
    let (w, h) = cropped_dimensions(width, height)?;
    Ok((w as usize / BLOCK) * (h as usize / BLOCK) * BITS_PER_BLOCK)
}

/// A view of one block row: 8 raster rows starting at a block boundary.
struct BlockRow<T> {
    rows: T,
    stride: usize,
    channels: usize,
}

impl<T: AsRef<[u8]>> BlockRow<T> {
    fn new(rows: T, stride: usize, channels: usize) -> Self {
        Self { rows, stride, channels }
    }

    #[inline]
    fn offset(&self, bc: usize, ch: usize, y: usize, x: usize) -> usize {
        y * self.stride + (bc * BLOCK + x) * self.channels + ch
    }

    fn load(&self, bc: usize, ch: usize) -> [f64; 64] {
        let rows = self.rows.as_ref();
        let mut out = [0.0f64; 64];
        for y in 0..BLOCK {
            for x in 0..BLOCK {
                out[y * BLOCK + x] = f64::from(rows[self.offset(bc, ch, y, x)]);
            }
        }
        out
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> BlockRow<T> {
    fn store(&mut self, bc: usize, ch: usize, pixels: &[f64; 64]) {
        for y in 0..BLOCK {
            for x in 0..BLOCK {
                let idx = self.offset(bc, ch, y, x);
                self.rows.as_mut()[idx] = to_sample(pixels[y * BLOCK + x]);
            }
        }
    }

    /// Embed up to six bits into one block/channel unit.
    /// Returns `false` if clamping kept some coefficient off its parity.
    fn embed_unit(&mut self, bc: usize, ch: usize, bits: &[u8]) -> bool {
        let mut drive = forward_dct(&self.load(bc, ch));
        let mut targets = [0.0f64; COEFF_POSITIONS.len()];
        for ((&(u, v), &bit), target) in COEFF_POSITIONS.iter().zip(bits).zip(targets.iter_mut()) {
            let idx = u * 8 + v;
            *target = parity_level(drive[idx], QUANT_STEP, bit) as f64 * QUANT_STEP;
            drive[idx] = *target;
        }

        for _ in 0..MAX_REFINE_PASSES {
            self.store(bc, ch, &inverse_dct(&drive));
            let actual = forward_dct(&self.load(bc, ch));

            // Feed the shortfall back into the drive coefficients.
            let mut settled = true;
            for ((&(u, v), &bit), &target) in COEFF_POSITIONS.iter().zip(bits).zip(&targets) {
                let idx = u * 8 + v;
                if parity_bit(actual[idx], QUANT_STEP) != bit {
                    drive[idx] += target - actual[idx];
                    settled = false;
                }
            }
            if settled {
                return true;
            }
        }
        false
    }

    /// Embed a block row's bit range. Returns the number of unsettled units.
    fn embed_bits(&mut self, bits: &[u8]) -> usize {
        let mut unsettled = 0;
        for (bc, block_bits) in bits.chunks(BITS_PER_BLOCK).enumerate() {
            for (ch, unit_bits) in block_bits.chunks(COEFF_POSITIONS.len()).enumerate() {
                if !self.embed_unit(bc, ch, unit_bits) {
                    unsettled += 1;
                }
            }
        }
        unsettled
    }
}

impl<T: AsRef<[u8]>> BlockRow<T> {
    fn extract_bits(&self, blocks_wide: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(blocks_wide * BITS_PER_BLOCK);
        for bc in 0..blocks_wide {
            for ch in 0..COLOR_CHANNELS {
                let coeffs = forward_dct(&self.load(bc, ch));
                for &(u, v) in &COEFF_POSITIONS {
                    out.push(parity_bit(coeffs[u * 8 + v], QUANT_STEP));
                }
            }
        }
        out
    }
}

/// Embed `bits`; the result is the cropped RGB stego raster.
pub fn embed(cover: PixelBuffer, bits: &[u8]) -> Result<PixelBuffer, StegoError> {
    let (width, height) = cropped_dimensions(cover.width(), cover.height())?;
    let cap = capacity(width, height)?;
    if bits.len() > cap {
        return Err(StegoError::CapacityExceeded { required_bits: bits.len() as u64, capacity_bits: cap });
    }

    let mut stego = cover.to_rgb_cropped(width, height)?;
    let stride = stego.stride();
    let row_len = BLOCK * stride;
    let row_bits = (width as usize / BLOCK) * BITS_PER_BLOCK;
    let used_rows = bits.len().div_ceil(row_bits);
    let data = &mut stego.as_raw_mut()[..used_rows * row_len];

    let embed_row = |(br, rows): (usize, &mut [u8])| -> usize {
        let start = br * row_bits;
        let end = (start + row_bits).min(bits.len());
        BlockRow::new(rows, stride, COLOR_CHANNELS).embed_bits(&bits[start..end])
    };

    #[cfg(feature = "parallel")]
    let unsettled: usize = data.par_chunks_mut(row_len).enumerate().map(embed_row).sum();
    #[cfg(not(feature = "parallel"))]
    let unsettled: usize = data.chunks_mut(row_len).enumerate().map(embed_row).sum();

    if unsettled > 0 {
        warn!(unsettled, "DCT units clamped off their target parity");
    }
    Ok(stego)
}

/// Read up to `max_bits` bits using the stego raster's own dimensions.
pub fn extract(stego: &PixelBuffer, max_bits: usize) -> Result<Vec<u8>, StegoError> {
    let (width, _) = cropped_dimensions(stego.width(), stego.height())?;
    let want = max_bits.min(capacity(stego.width(), stego.height())?);
    let blocks_wide = width as usize / BLOCK;
    let row_bits = blocks_wide * BITS_PER_BLOCK;
    let stride = stego.stride();
    let row_len = BLOCK * stride;
    let channels = stego.channels();
    let used_rows = want.div_ceil(row_bits);
    let data = stego.as_raw();

    let extract_row = |br: usize| -> Vec<u8> {
        let rows = &data[br * row_len..(br + 1) * row_len];
        BlockRow::new(rows, stride, channels).extract_bits(blocks_wide)
    };

    #[cfg(feature = "parallel")]
    let per_row: Vec<Vec<u8>> = (0..used_rows).into_par_iter().map(extract_row).collect();
    #[cfg(not(feature = "parallel"))]
    let per_row: Vec<Vec<u8>> = (0..used_rows).map(extract_row).collect();

    let mut out: Vec<u8> = per_row.concat();
    out.truncate(want);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height as usize {
            for x in 0..width as usize {
                for ch in 0..3 {
                    let v = 96 + (x * 5 + y * 3 + ch * 17) % 64 + ((x * y + ch) % 7);
                    data.push(v as u8);
                }
            }
        }
        PixelBuffer::new(width, height, 3, data).unwrap()
    }

    #[test]
    fn dct_roundtrip_is_identity() {
        let mut block = [0.0f64; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = ((i * 37) % 256) as f64;
        }
        let back = inverse_dct(&forward_dct(&block));
        for i in 0..64 {
            assert!((back[i] - block[i]).abs() < 1e-9, "index {i}");
        }
    }

    #[test]
    fn flat_block_has_only_dc() {
        let coeffs = forward_dct(&[200.0; 64]);
        // Orthonormal DC = 8 · (200 − 128).
        assert!((coeffs[0] - 576.0).abs() < 1e-9);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-9);
        }
    }

    #[test]
    fn capacity_and_cropping() {
        assert_eq!(capacity(64, 64).unwrap(), 1152);
        assert_eq!(capacity(70, 17).unwrap(), 8 * 2 * 18);
        assert_eq!(cropped_dimensions(70, 17).unwrap(), (64, 16));
        assert!(matches!(capacity(7, 64), Err(StegoError::InvalidDimensions { .. })));
    }

    #[test]
    fn embed_extract_roundtrip() {
        let cover = textured(32, 24);
        let cap = capacity(32, 24).unwrap();
        let bits: Vec<u8> = (0..cap).map(|i| ((i * 11 + i / 5) % 2) as u8).collect();
        let stego = embed(cover, &bits).unwrap();
        assert_eq!((stego.width(), stego.height()), (32, 24));
        assert_eq!(extract(&stego, cap).unwrap(), bits);
    }

    #[test]
    fn output_is_cropped_rgb() {
        let data = vec![128u8; 21 * 10 * 4];
        let cover = PixelBuffer::new(21, 10, 4, data).unwrap();
        let stego = embed(cover, &[1, 0, 1]).unwrap();
        assert_eq!((stego.width(), stego.height(), stego.channels()), (16, 8, 3));
        assert_eq!(extract(&stego, 3).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn partial_payload_leaves_later_blocks_alone() {
        let cover = textured(32, 16);
        let before = cover.clone();
        let stego = embed(cover, &[1; 5]).unwrap();
        // Second block row carries nothing and must be byte-identical.
        let row_len = 8 * stego.stride();
        assert_eq!(&stego.as_raw()[row_len..], &before.as_raw()[row_len..]);
        assert_eq!(extract(&stego, 5).unwrap(), vec![1; 5]);
    }

    #[test]
    fn saturated_blocks_still_decode() {
        let mut data = vec![255u8; 16 * 8 * 3];
        for v in data.iter_mut().skip(8 * 3 * 8) {
            *v = 0;
        }
        let cover = PixelBuffer::new(16, 8, 3, data).unwrap();
        let bits: Vec<u8> = (0..36).map(|i| (i % 3 == 0) as u8).collect();
        let stego = embed(cover, &bits).unwrap();
        assert_eq!(extract(&stego, 36).unwrap(), bits);
    }

    #[test]
    fn capacity_boundary() {
        let cap = capacity(16, 16).unwrap();
        assert!(embed(textured(16, 16), &vec![0u8; cap]).is_ok());
        assert!(matches!(
            embed(textured(16, 16), &vec![0u8; cap + 1]),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }
}
