// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Byte ↔ bit conversion.
//!
//! Bits are stored one per `u8` (value 0 or 1), MSB first within each byte.
//! Every embedding engine consumes and produces this representation.

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

/// Pack up to 8 bits (MSB first) into the low end of a `u8`.
pub(crate) fn pack_value(bits: &[u8]) -> u8 {
    debug_assert!(bits.len() <= 8);
    bits.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1))
}

/// Append the `count` low bits of `value` to `out`, MSB first.
pub(crate) fn push_value(out: &mut Vec<u8>, value: u8, count: u32) {
    for pos in (0..count).rev() {
        out.push((value >> pos) & 1);
    }
}
