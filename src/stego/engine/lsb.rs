// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Spatial least-significant-bit embedding.
//!
//! Each selected channel sample gives up its `bits_per_channel` low bits.
//! Traversal: pixel index ascending, then the configured channel order, then
//! bit positions high to low within the chunk. When the bit stream ends in
//! the middle of a chunk, the remaining bits take the high positions and the
//! low positions keep their cover value.

use crate::raster::{Channel, PixelBuffer};
use crate::stego::bits::{pack_value, push_value};
use crate::stego::error::StegoError;

/// Validated LSB parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsbParams {
    bits_per_channel: u8,
    channels: Vec<Channel>,
}

impl LsbParams {
    /// # Errors
    /// [`StegoError::InvalidOptions`] if `bits_per_channel` is outside 1–8 or
    /// `channels` is empty or lists a channel twice.
    pub fn new(bits_per_channel: u8, channels: Vec<Channel>) -> Result<Self, StegoError> {
        if !(1..=8).contains(&bits_per_channel) {
            return Err(StegoError::InvalidOptions("bits per channel must be between 1 and 8"));
        }
        if channels.is_empty() {
            return Err(StegoError::InvalidOptions("at least one channel must be selected"));
        }
        for (i, ch) in channels.iter().enumerate() {
            if channels[..i].contains(ch) {
                return Err(StegoError::InvalidOptions("channel listed more than once"));
            }
        }
        Ok(Self { bits_per_channel, channels })
    }

    pub fn bits_per_channel(&self) -> u8 {
        self.bits_per_channel
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

impl Default for LsbParams {
    fn default() -> Self {
        Self { bits_per_channel: 1, channels: Channel::RGB.to_vec() }
    }
}

/// `pixels × channels × bits_per_channel`.
pub fn capacity(width: u32, height: u32, params: &LsbParams) -> usize {
    width as usize * height as usize * params.channels.len() * params.bits_per_channel as usize
}

/// Replace the low bits of `sample` with `chunk`, aligned to the top of the
/// `bpc`-bit field.
fn write_chunk(sample: u8, chunk: &[u8], bpc: usize) -> u8 {
    let n = chunk.len();
    let shift = bpc - n;
    let mask = (((1u16 << n) - 1) << shift) as u8;
    (sample & !mask) | (pack_value(chunk) << shift)
}

pub fn embed(mut cover: PixelBuffer, bits: &[u8], params: &LsbParams) -> Result<PixelBuffer, StegoError> {
    let cap = capacity(cover.width(), cover.height(), params);
    if bits.len() > cap {
        return Err(StegoError::CapacityExceeded { required_bits: bits.len() as u64, capacity_bits: cap });
    }

    let bpc = params.bits_per_channel as usize;
    let samples_per_pixel = cover.channels();
    let mut chunks = bits.chunks(bpc);

    'pixels: for px in cover.as_raw_mut().chunks_exact_mut(samples_per_pixel) {
        for ch in &params.channels {
            let Some(chunk) = chunks.next() else { break 'pixels };
            let off = ch.offset();
            px[off] = write_chunk(px[off], chunk, bpc);
        }
    }
    Ok(cover)
}

pub fn extract(stego: &PixelBuffer, max_bits: usize, params: &LsbParams) -> Vec<u8> {
    let want = max_bits.min(capacity(stego.width(), stego.height(), params));
    let bpc = u32::from(params.bits_per_channel);
    let mut out = Vec::with_capacity(want + 8);

    'pixels: for px in stego.as_raw().chunks_exact(stego.channels()) {
        for ch in &params.channels {
            if out.len() >= want {
                break 'pixels;
            }
            push_value(&mut out, px[ch.offset()], bpc);
        }
    }
    out.truncate(want);
    out
}
