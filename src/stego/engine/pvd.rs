// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Pixel-value differencing over horizontal pairs.
//!
//! Each color channel is cut into pairs `(x, x + 1)` for even `x`. The
//! absolute difference of a pair selects a [`Range`]; the pair carries
//! `range.bits` payload bits by moving its difference to
//! `range.lower + value`. Because the new difference stays inside the same
//! range, the decoder re-derives the same bit count from the stego pixels.
//!
//! Capacity is therefore content dependent, and embed and extract must walk
//! the pairs in exactly the same order: [`pair_sites`] is that order.

use crate::raster::PixelBuffer;
use crate::stego::bits::{pack_value, push_value};
use crate::stego::error::StegoError;

/// A difference range and the number of bits a pair in it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub lower: u8,
    pub upper: u8,
    pub bits: u32,
}

pub const RANGES: [Range; 6] = [
    Range { lower: 0, upper: 7, bits: 3 },
    Range { lower: 8, upper: 15, bits: 3 },
    Range { lower: 16, upper: 31, bits: 4 },
    Range { lower: 32, upper: 63, bits: 5 },
    Range { lower: 64, upper: 127, bits: 6 },
    Range { lower: 128, upper: 255, bits: 7 },
];

const COLOR_CHANNELS: usize = 3;

/// The range containing `diff`.
pub fn range_for(diff: u8) -> Range {
    // RANGES covers 0..=255 without gaps.
    RANGES
        .iter()
        .copied()
        .find(|r| diff <= r.upper)
        .unwrap_or(RANGES[RANGES.len() - 1])
}

/// One horizontal pair: pixels `(col, row)` and `(col + 1, row)` of `channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSite {
    pub channel: usize,
    pub row: usize,
    pub col: usize,
}

/// Every pair of a `width × height` image, in embedding order:
/// channel, then row, then column pair.
pub fn pair_sites(width: u32, height: u32) -> impl Iterator<Item = PairSite> {
    let pairs_per_row = width as usize / 2;
    let height = height as usize;
    (0..COLOR_CHANNELS).flat_map(move |channel| {
        (0..height).flat_map(move |row| {
            (0..pairs_per_row).map(move |p| PairSite { channel, row, col: 2 * p })
        })
    })
}

fn check_dimensions(pixels: &PixelBuffer) -> Result<(), StegoError> {
    if pixels.width() < 2 {
        return Err(StegoError::dimensions(pixels.width(), pixels.height(), "PVD needs at least two columns"));
    }
    Ok(())
}

fn pair_values(pixels: &PixelBuffer, site: PairSite) -> (u8, u8) {
    (
        pixels.sample(site.col, site.row, site.channel),
        pixels.sample(site.col + 1, site.row, site.channel),
    )
}

/// Sum of the per-pair bit counts of `pixels`.
pub fn capacity(pixels: &PixelBuffer) -> Result<usize, StegoError> {
    check_dimensions(pixels)?;
    Ok(pair_sites(pixels.width(), pixels.height())
        .map(|site| {
            let (a, b) = pair_values(pixels, site);
            range_for(a.abs_diff(b)).bits as usize
        })
        .sum())
}

/// Move the pair's difference to `new_diff`.
///
/// The smaller pixel (the left one on a tie) absorbs `-⌊m/2⌋`, the larger
/// one `m - ⌊m/2⌋`, where `m = new_diff - diff`. A pair pushed outside
/// `[0, 255]` is shifted back as a whole so the difference survives.
fn redistribute(left: u8, right: u8, new_diff: u8) -> (u8, u8) {
    let (l, r) = (i32::from(left), i32::from(right));
    let m = i32::from(new_diff) - (l - r).abs();
    let lo = m / 2;
    let hi = m - lo;

    let (mut l, mut r) = if l <= r { (l - lo, r + hi) } else { (l + hi, r - lo) };

    let shift = if l.min(r) < 0 {
        -l.min(r)
    } else if l.max(r) > 255 {
        255 - l.max(r)
    } else {
        0
    };
    l += shift;
    r += shift;
    (l as u8, r as u8)
}

pub fn embed(mut cover: PixelBuffer, bits: &[u8]) -> Result<PixelBuffer, StegoError> {
    let cap = capacity(&cover)?;
    if bits.len() > cap {
        return Err(StegoError::CapacityExceeded { required_bits: bits.len() as u64, capacity_bits: cap });
    }

    let mut rest = bits;
    for site in pair_sites(cover.width(), cover.height()) {
        if rest.is_empty() {
            break;
        }
        let (left, right) = pair_values(&cover, site);
        let diff = left.abs_diff(right);
        let range = range_for(diff);

        let take = rest.len().min(range.bits as usize);
        let (chunk, tail) = rest.split_at(take);
        rest = tail;

        // A short final chunk fills the high bits; the low bits keep the
        // cover's own offset.
        let keep = range.bits - take as u32;
        let mask = (1u8 << keep) - 1;
        let value = (pack_value(chunk) << keep) | ((diff - range.lower) & mask);

        let (l, r) = redistribute(left, right, range.lower + value);
        cover.set_sample(site.col, site.row, site.channel, l);
        cover.set_sample(site.col + 1, site.row, site.channel, r);
    }
    Ok(cover)
}

pub fn extract(stego: &PixelBuffer, max_bits: usize) -> Result<Vec<u8>, StegoError> {
    check_dimensions(stego)?;
    let mut out = Vec::with_capacity(max_bits.min(stego.pixel_count() * 2));
    for site in pair_sites(stego.width(), stego.height()) {
        if out.len() >= max_bits {
            break;
        }
        let (left, right) = pair_values(stego, site);
        let diff = left.abs_diff(right);
        let range = range_for(diff);
        push_value(&mut out, diff - range.lower, range.bits);
    }
    out.truncate(max_bits);
    Ok(out)
}
