// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers every failure mode from raster validation through
//! envelope parsing, decryption and integrity verification. All of them are
//! fatal to the current call; nothing is retried inside the engine.

use thiserror::Error;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The envelope prefix does not carry the expected tag.
    #[error("invalid magic: not a recognized stego image or wrong algorithm assumed")]
    InvalidMagic,

    /// Fewer bytes were extracted than the envelope header declares.
    #[error("truncated header: need {needed} bytes, only {available} available")]
    TruncatedHeader { needed: usize, available: usize },

    /// The envelope declares more payload than the image can physically carry.
    #[error("truncated payload: envelope declares {needed_bits} bits, image holds {capacity_bits}")]
    TruncatedPayload { needed_bits: u64, capacity_bits: usize },

    /// Header + payload do not fit in the cover under the chosen algorithm.
    #[error("message too large: {required_bits} bits required, capacity is {capacity_bits} bits")]
    CapacityExceeded { required_bits: u64, capacity_bits: usize },

    /// The raster is malformed or below the algorithm's minimum size.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions { width: u32, height: u32, reason: &'static str },

    /// Encryption flag and crypto parameters disagree.
    #[error("invalid crypto parameters for envelope")]
    InvalidCryptoParams,

    /// The envelope is encrypted but no passphrase was supplied.
    #[error("payload is encrypted: passphrase required")]
    PassphraseRequired,

    /// AEAD tag verification failed (wrong passphrase or corrupted data).
    #[error("authentication failed (wrong passphrase or corrupted ciphertext)")]
    AuthenticationFailed,

    /// The recovered plaintext does not hash to the stored digest.
    #[error("integrity mismatch: recovered payload does not match its digest")]
    IntegrityMismatch,

    /// The supplied options are out of range.
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
}

impl StegoError {
    pub(crate) fn dimensions(width: u32, height: u32, reason: &'static str) -> Self {
        Self::InvalidDimensions { width, height, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = StegoError::CapacityExceeded { required_bits: 2280, capacity_bits: 1152 };
        let msg = e.to_string();
        assert!(msg.contains("2280"), "{msg}");
        assert!(msg.contains("1152"), "{msg}");

        let e = StegoError::dimensions(4, 4, "DCT needs at least one 8x8 block");
        assert_eq!(e.to_string(), "invalid dimensions 4x4: DCT needs at least one 8x8 block");
    }

    #[test]
    fn auth_and_integrity_are_distinct() {
        let auth = StegoError::AuthenticationFailed.to_string();
        let integrity = StegoError::IntegrityMismatch.to_string();
        assert_ne!(auth, integrity);
    }
}
