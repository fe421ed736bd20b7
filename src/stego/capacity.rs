// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Header-aware capacity report.
//!
//! Engines count raw bits. Callers want to know how many payload bytes
//! fit once the envelope header is paid for, which differs between plain
//! (41-byte header) and encrypted (85-byte header) envelopes.

use serde::Serialize;

use crate::raster::PixelBuffer;
use crate::stego::envelope::{ENCRYPTED_HEADER_LEN, PLAIN_HEADER_LEN};
use crate::stego::error::StegoError;
use crate::stego::options::{Algorithm, StegoOptions};

/// Capacity of one cover under one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityInfo {
    pub algorithm: Algorithm,
    /// Stego dimensions (DCT crops to whole blocks).
    pub width: u32,
    pub height: u32,
    /// Raw embeddable bits, header included.
    pub capacity_bits: usize,
    /// Largest payload in bytes that fits unencrypted.
    pub max_plain_payload: usize,
    /// Largest payload in bytes that fits encrypted.
    pub max_encrypted_payload: usize,
}

fn payload_room(capacity_bits: usize, header_len: usize) -> usize {
    (capacity_bits / 8)
        .saturating_sub(header_len)
        .min(u32::MAX as usize)
}

/// Compute the capacity of `cover` for `options`.
///
/// For PVD the figure depends on the cover's pixel values; the stego image
/// reports the same capacity as its cover.
///
/// # Errors
/// - [`StegoError::InvalidOptions`] for out-of-range LSB options.
/// - [`StegoError::InvalidDimensions`] if the cover is below the engine's minimum.
pub fn capacity(cover: &PixelBuffer, options: &StegoOptions) -> Result<CapacityInfo, StegoError> {
    let engine = options.engine()?;
    let (width, height) = engine.output_dimensions(cover.width(), cover.height())?;
    let capacity_bits = engine.capacity(cover)?;
    Ok(CapacityInfo {
        algorithm: engine.algorithm(),
        width,
        height,
        capacity_bits,
        max_plain_payload: payload_room(capacity_bits, PLAIN_HEADER_LEN),
        max_encrypted_payload: payload_room(capacity_bits, ENCRYPTED_HEADER_LEN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, 3, vec![128; width as usize * height as usize * 3]).unwrap()
    }

    #[test]
    fn lsb_64x64() {
        let info = capacity(&gray(64, 64), &StegoOptions::new(Algorithm::Lsb)).unwrap();
        assert_eq!(info.capacity_bits, 12_288);
        assert_eq!(info.max_plain_payload, 1536 - 41);
        assert_eq!(info.max_encrypted_payload, 1536 - 85);
    }

    #[test]
    fn dct_reports_cropped_size() {
        let info = capacity(&gray(70, 17), &StegoOptions::new(Algorithm::Dct)).unwrap();
        assert_eq!((info.width, info.height), (64, 16));
        assert_eq!(info.capacity_bits, 8 * 2 * 18);
        // 288 bits = 36 bytes: not even a plain header fits.
        assert_eq!(info.max_plain_payload, 0);
        assert_eq!(info.max_encrypted_payload, 0);
    }

    #[test]
    fn dwt_and_pvd() {
        let dwt = capacity(&gray(32, 32), &StegoOptions::new(Algorithm::Dwt)).unwrap();
        assert_eq!(dwt.capacity_bits, 16 * 16 * 3);
        // Flat cover: every pair in the 0..=7 range, 3 bits each.
        let pvd = capacity(&gray(32, 32), &StegoOptions::new(Algorithm::Pvd)).unwrap();
        assert_eq!(pvd.capacity_bits, 16 * 32 * 3 * 3);
    }

    #[test]
    fn too_small_cover_is_rejected() {
        let err = capacity(&gray(7, 64), &StegoOptions::new(Algorithm::Dct)).unwrap_err();
        assert!(matches!(err, StegoError::InvalidDimensions { .. }));
    }
}
