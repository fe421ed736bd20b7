// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Owned interleaved raster buffers.
//!
//! The engine never decodes image files. Callers hand over raw 8-bit
//! samples in row-major, interleaved order (`RGB` or `RGBA`) together with
//! the dimensions, and get an owned buffer of the same shape back. Alpha,
//! when present, is carried along but never modified.

use serde::{Deserialize, Serialize};

use crate::stego::error::StegoError;

/// A color channel an engine may embed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[serde(alias = "r", alias = "R")]
    Red,
    #[serde(alias = "g", alias = "G")]
    Green,
    #[serde(alias = "b", alias = "B")]
    Blue,
}

impl Channel {
    /// All color channels in canonical order.
    pub const RGB: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Sample offset within an interleaved pixel.
    pub fn offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Interleaved 8-bit raster with 3 (RGB) or 4 (RGBA) samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw samples.
    ///
    /// # Errors
    /// [`StegoError::InvalidDimensions`] if either dimension is zero, the
    /// channel count is not 3 or 4, or `data` has the wrong length.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self, StegoError> {
        if width == 0 || height == 0 {
            return Err(StegoError::dimensions(width, height, "empty raster"));
        }
        if channels != 3 && channels != 4 {
            return Err(StegoError::dimensions(width, height, "expected 3 (RGB) or 4 (RGBA) channels"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|p| p.checked_mul(channels));
        if expected != Some(data.len()) {
            return Err(StegoError::dimensions(width, height, "sample count does not match dimensions"));
        }
        Ok(Self { width, height, channels, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel (3 or 4).
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Samples per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Sample index of channel `ch` at (x, y).
    #[inline]
    pub fn index(&self, x: usize, y: usize, ch: usize) -> usize {
        debug_assert!(x < self.width as usize && y < self.height as usize && ch < self.channels);
        y * self.stride() + x * self.channels + ch
    }

    pub fn sample(&self, x: usize, y: usize, ch: usize) -> u8 {
        self.data[self.index(x, y, ch)]
    }

    pub fn set_sample(&mut self, x: usize, y: usize, ch: usize, value: u8) {
        let idx = self.index(x, y, ch);
        self.data[idx] = value;
    }

    /// Copy the top-left `width × height` region into a new RGB buffer,
    /// dropping alpha.
    pub fn to_rgb_cropped(&self, width: u32, height: u32) -> Result<PixelBuffer, StegoError> {
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return Err(StegoError::dimensions(width, height, "crop outside source raster"));
        }
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height as usize {
            let row = y * self.stride();
            for x in 0..width as usize {
                let px = row + x * self.channels;
                data.extend_from_slice(&self.data[px..px + 3]);
            }
        }
        PixelBuffer::new(width, height, 3, data)
    }
}
