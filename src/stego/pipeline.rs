// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encode/decode pipeline.
//!
//! Encode: plaintext → (optional AEAD) → envelope → bits → engine.
//! Decode runs the envelope protocol in three reads, because the header's
//! own length is only known after its first bytes are parsed:
//! 1. the 41-byte plain header (enough for magic + flags + length),
//! 2. the full header if the flags announce crypto parameters,
//! 3. header + payload, once the declared length is checked against the
//!    image's capacity.
//!
//! Integrity is verified last, on the recovered plaintext.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::raster::PixelBuffer;
use crate::stego::bits::{bits_to_bytes, bytes_to_bits};
use crate::stego::crypto::{self, DIGEST_LEN};
use crate::stego::engine::Engine;
use crate::stego::envelope::{self, header_len, PLAIN_HEADER_LEN};
use crate::stego::error::StegoError;
use crate::stego::options::{Algorithm, StegoOptions};

/// Where a call is in the codec state machine.
///
/// Encode walks `Idle → ValidatingCapacity → Embedding → Done`; decode walks
/// `Idle → ExtractingBits → ParsingEnvelope → [Decrypting] →
/// VerifyingIntegrity → Done`. A failure ends the call in the stage it
/// happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ValidatingCapacity,
    Embedding,
    ExtractingBits,
    ParsingEnvelope,
    Decrypting,
    VerifyingIntegrity,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Idle => "idle",
            Stage::ValidatingCapacity => "validating-capacity",
            Stage::Embedding => "embedding",
            Stage::ExtractingBits => "extracting-bits",
            Stage::ParsingEnvelope => "parsing-envelope",
            Stage::Decrypting => "decrypting",
            Stage::VerifyingIntegrity => "verifying-integrity",
            Stage::Done => "done",
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
}

/// Figures reported alongside the stego pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeMetrics {
    pub width: u32,
    pub height: u32,
    pub capacity_bits: usize,
    /// Header + payload bits actually embedded.
    pub used_bits: usize,
    pub algorithm: Algorithm,
    pub encrypted: bool,
}

#[derive(Debug, Clone)]
pub struct EncodeOutput {
    /// Stego raster. Same shape as the cover, except DCT (cropped, RGB).
    pub pixels: PixelBuffer,
    pub metrics: EncodeMetrics,
}

#[derive(Debug, Clone)]
pub struct DecodeOutput {
    pub payload: Vec<u8>,
    /// SHA-256 of `payload`, as stored in (and verified against) the envelope.
    pub digest: [u8; DIGEST_LEN],
    pub encrypted: bool,
}

/// Hide `payload` in `cover`.
///
/// A passphrase in `options` turns on encryption. Capacity is checked
/// before key derivation and before any pixel is touched.
///
/// # Errors
/// - [`StegoError::InvalidOptions`] for out-of-range LSB options.
/// - [`StegoError::InvalidDimensions`] if the cover is below the engine's minimum.
/// - [`StegoError::CapacityExceeded`] if header + payload do not fit.
pub fn encode(cover: PixelBuffer, payload: &[u8], options: &StegoOptions) -> Result<EncodeOutput, StegoError> {
    let mut stage = Stage::Idle;
    encode_impl(cover, payload, options, &mut stage)
        .inspect_err(|e| debug!(%stage, error = %e, "encode failed"))
}

fn encode_impl(
    cover: PixelBuffer,
    payload: &[u8],
    options: &StegoOptions,
    stage: &mut Stage,
) -> Result<EncodeOutput, StegoError> {
    advance(stage, Stage::ValidatingCapacity);
    let engine = options.engine()?;
    let (width, height) = engine.output_dimensions(cover.width(), cover.height())?;
    let capacity_bits = engine.capacity(&cover)?;

    let passphrase = options.passphrase();
    let encrypted = passphrase.is_some();
    let required_bits = (header_len(encrypted) as u64 + payload.len() as u64) * 8;
    let too_large = StegoError::CapacityExceeded { required_bits, capacity_bits };
    if required_bits > capacity_bits as u64 {
        return Err(too_large);
    }
    let payload_len = u32::try_from(payload.len()).map_err(|_| too_large)?;
    debug!(algorithm = %engine.algorithm(), required_bits, capacity_bits, encrypted, "capacity ok");

    advance(stage, Stage::Embedding);
    let digest = crypto::digest(payload);
    let (body, params) = match passphrase {
        Some(passphrase) => {
            let sealed = crypto::encrypt(payload, passphrase)?;
            (sealed.ciphertext, Some(sealed.params))
        }
        None => (payload.to_vec(), None),
    };
    let mut frame = envelope::build_header(payload_len, encrypted, &digest, params.as_ref())?;
    frame.extend_from_slice(&body);

    let bits = bytes_to_bits(&frame);
    let pixels = engine.embed(cover, &bits)?;
    advance(stage, Stage::Done);

    Ok(EncodeOutput {
        pixels,
        metrics: EncodeMetrics {
            width,
            height,
            capacity_bits,
            used_bits: bits.len(),
            algorithm: engine.algorithm(),
            encrypted,
        },
    })
}

/// Recover the payload hidden in `stego`.
///
/// `options.algorithm` (and the LSB settings) must match the ones used to
/// encode. A passphrase is only consulted for encrypted envelopes.
///
/// # Errors
/// - [`StegoError::InvalidMagic`] if no envelope is found (wrong algorithm, or
///   not a stego image).
/// - [`StegoError::TruncatedHeader`] / [`StegoError::TruncatedPayload`] if the
///   image cannot hold what the header declares.
/// - [`StegoError::PassphraseRequired`] if the envelope is encrypted and no
///   passphrase was given.
/// - [`StegoError::AuthenticationFailed`] on a wrong passphrase or tampered
///   ciphertext.
/// - [`StegoError::IntegrityMismatch`] if the plaintext does not match its digest.
pub fn decode(stego: &PixelBuffer, options: &StegoOptions) -> Result<DecodeOutput, StegoError> {
    let mut stage = Stage::Idle;
    decode_impl(stego, options, &mut stage).inspect_err(|e| debug!(%stage, error = %e, "decode failed"))
}

/// Extract the first `len` bytes; fewer if the image runs out.
fn read_bytes(engine: &Engine, stego: &PixelBuffer, len: usize) -> Result<Vec<u8>, StegoError> {
    let mut bits = engine.extract(stego, len.saturating_mul(8))?;
    bits.truncate(bits.len() / 8 * 8);
    trace!(requested = len, got = bits.len() / 8, "extracted bytes");
    Ok(bits_to_bytes(&bits))
}

fn decode_impl(stego: &PixelBuffer, options: &StegoOptions, stage: &mut Stage) -> Result<DecodeOutput, StegoError> {
    advance(stage, Stage::ExtractingBits);
    let engine = options.engine()?;
    let capacity_bits = engine.capacity(stego)?;
    let mut head = read_bytes(&engine, stego, PLAIN_HEADER_LEN)?;

    advance(stage, Stage::ParsingEnvelope);
    let prefix = envelope::parse_prefix(&head)?;
    if prefix.encrypted && head.len() == PLAIN_HEADER_LEN {
        head = read_bytes(&engine, stego, prefix.header_len)?;
    }
    let env = envelope::parse_full(&head)?;

    let passphrase = match (env.is_encrypted(), options.passphrase()) {
        (true, None) => return Err(StegoError::PassphraseRequired),
        (true, passphrase) => passphrase,
        (false, _) => None,
    };

    let needed_bits = env.total_len() * 8;
    if needed_bits > capacity_bits as u64 {
        return Err(StegoError::TruncatedPayload { needed_bits, capacity_bits });
    }
    debug!(payload_len = env.payload_len, encrypted = env.is_encrypted(), "envelope parsed");

    let frame = read_bytes(&engine, stego, env.total_len() as usize)?;
    let body = frame
        .get(env.header_len()..)
        .filter(|body| body.len() == env.payload_len as usize)
        .ok_or(StegoError::TruncatedPayload { needed_bits, capacity_bits })?;

    let payload = match (&env.crypto, passphrase) {
        (Some(params), Some(passphrase)) => {
            advance(stage, Stage::Decrypting);
            crypto::decrypt(body, passphrase, params)?
        }
        _ => body.to_vec(),
    };

    advance(stage, Stage::VerifyingIntegrity);
    if crypto::digest(&payload) != env.digest {
        return Err(StegoError::IntegrityMismatch);
    }
    advance(stage, Stage::Done);

    Ok(DecodeOutput {
        payload,
        digest: env.digest,
        encrypted: env.is_encrypted(),
    })
}
