// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Envelope construction and parsing.
//!
//! The envelope is the self-describing header that precedes every embedded
//! payload. All engines use the same layout:
//!
//! ```text
//! [4 bytes ] magic "PHSR"
//! [1 byte  ] flags (bit 0 = encrypted, bits 1..7 reserved, must be zero)
//! [4 bytes ] payload length (big-endian u32, bytes after the header)
//! [32 bytes] SHA-256 of the plaintext
//! -- present only if encrypted --
//! [16 bytes] PBKDF2 salt
//! [12 bytes] AES-GCM-SIV nonce
//! [16 bytes] AES-GCM-SIV tag
//! ```
//!
//! Header size is 41 bytes plain, 85 bytes encrypted. The size is fully
//! determined by the first 5 bytes, so a decoder extracts the 41-byte
//! minimum, calls [`parse_prefix`] to learn the real size, then extracts the
//! rest and calls [`parse_full`].

use crate::stego::crypto::{CryptoParams, DIGEST_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::stego::error::StegoError;

/// Format tag at offset 0.
pub const MAGIC: [u8; 4] = *b"PHSR";

/// Flags bit marking an encrypted payload.
pub const FLAG_ENCRYPTED: u8 = 0x01;

/// Bytes needed to learn the header size: magic + flags.
pub const PREFIX_LEN: usize = MAGIC.len() + 1;

/// Header size of an unencrypted envelope: magic(4) + flags(1) + len(4) + digest(32).
pub const PLAIN_HEADER_LEN: usize = PREFIX_LEN + 4 + DIGEST_LEN; // 41

/// Header size of an encrypted envelope: plain header + salt(16) + nonce(12) + tag(16).
pub const ENCRYPTED_HEADER_LEN: usize = PLAIN_HEADER_LEN + SALT_LEN + NONCE_LEN + TAG_LEN; // 85

/// Header size for the given encryption state.
pub const fn header_len(encrypted: bool) -> usize {
    if encrypted {
        ENCRYPTED_HEADER_LEN
    } else {
        PLAIN_HEADER_LEN
    }
}

/// What the first 5 bytes reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopePrefix {
    pub encrypted: bool,
    pub header_len: usize,
}

/// A fully parsed envelope header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Bytes following the header (plaintext, or ciphertext of equal length).
    pub payload_len: u32,
    /// SHA-256 of the plaintext, computed before encryption.
    pub digest: [u8; DIGEST_LEN],
    /// Present if and only if the payload is encrypted.
    pub crypto: Option<CryptoParams>,
}

impl Envelope {
    pub fn is_encrypted(&self) -> bool {
        self.crypto.is_some()
    }

    pub fn header_len(&self) -> usize {
        header_len(self.is_encrypted())
    }

    /// Header plus payload, in bytes.
    pub fn total_len(&self) -> u64 {
        self.header_len() as u64 + u64::from(self.payload_len)
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_len());
        out.extend_from_slice(&MAGIC);
        out.push(if self.is_encrypted() { FLAG_ENCRYPTED } else { 0 });
        out.extend_from_slice(&self.payload_len.to_be_bytes());
        out.extend_from_slice(&self.digest);
        if let Some(params) = &self.crypto {
            out.extend_from_slice(&params.salt);
            out.extend_from_slice(&params.nonce);
            out.extend_from_slice(&params.tag);
        }
        out
    }
}

/// Build an envelope header.
///
/// # Errors
/// [`StegoError::InvalidCryptoParams`] if `encrypted` is set without crypto
/// parameters, or parameters are given for an unencrypted payload.
pub fn build_header(
    payload_len: u32,
    encrypted: bool,
    digest: &[u8; DIGEST_LEN],
    crypto: Option<&CryptoParams>,
) -> Result<Vec<u8>, StegoError> {
    if encrypted != crypto.is_some() {
        return Err(StegoError::InvalidCryptoParams);
    }
    let envelope = Envelope {
        payload_len,
        digest: *digest,
        crypto: crypto.cloned(),
    };
    Ok(envelope.to_bytes())
}

/// Read magic + flags and report the full header size.
pub fn parse_prefix(bytes: &[u8]) -> Result<EnvelopePrefix, StegoError> {
    if bytes.len() < PREFIX_LEN {
        return Err(StegoError::TruncatedHeader { needed: PREFIX_LEN, available: bytes.len() });
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(StegoError::InvalidMagic);
    }
    let flags = bytes[MAGIC.len()];
    // Reserved bits set means this is not an envelope we wrote.
    if flags & !FLAG_ENCRYPTED != 0 {
        return Err(StegoError::InvalidMagic);
    }
    let encrypted = flags & FLAG_ENCRYPTED != 0;
    Ok(EnvelopePrefix { encrypted, header_len: header_len(encrypted) })
}

/// Parse a complete header. `bytes` may extend past the header.
pub fn parse_full(bytes: &[u8]) -> Result<Envelope, StegoError> {
    let prefix = parse_prefix(bytes)?;
    if bytes.len() < prefix.header_len {
        return Err(StegoError::TruncatedHeader {
            needed: prefix.header_len,
            available: bytes.len(),
        });
    }

    let mut pos = PREFIX_LEN;
    let payload_len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
    pos += 4;

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&bytes[pos..pos + DIGEST_LEN]);
    pos += DIGEST_LEN;

    let crypto = if prefix.encrypted {
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[pos..pos + SALT_LEN]);
        pos += SALT_LEN;
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[pos..pos + NONCE_LEN]);
        pos += NONCE_LEN;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[pos..pos + TAG_LEN]);
        Some(CryptoParams { salt, nonce, tag })
    } else {
        None
    };

    Ok(Envelope { payload_len, digest, crypto })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> CryptoParams {
        CryptoParams { salt: [1u8; SALT_LEN], nonce: [2u8; NONCE_LEN], tag: [3u8; TAG_LEN] }
    }

    #[test]
    fn header_sizes() {
        assert_eq!(PLAIN_HEADER_LEN, 41);
        assert_eq!(ENCRYPTED_HEADER_LEN, 85);
        let plain = build_header(5, false, &[0u8; 32], None).unwrap();
        assert_eq!(plain.len(), 41);
        let enc = build_header(5, true, &[0u8; 32], Some(&sample_params())).unwrap();
        assert_eq!(enc.len(), 85);
    }

    #[test]
    fn layout_is_bit_exact() {
        let digest = [0xAB; 32];
        let header = build_header(0x0102_0304, true, &digest, Some(&sample_params())).unwrap();
        assert_eq!(&header[0..4], b"PHSR");
        assert_eq!(header[4], 0x01);
        assert_eq!(&header[5..9], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&header[9..41], &digest);
        assert_eq!(&header[41..57], &[1u8; 16]);
        assert_eq!(&header[57..69], &[2u8; 12]);
        assert_eq!(&header[69..85], &[3u8; 16]);
    }

    #[test]
    fn build_parse_roundtrip() {
        let digest = [7u8; 32];
        let header = build_header(200, true, &digest, Some(&sample_params())).unwrap();
        let env = parse_full(&header).unwrap();
        assert_eq!(env.payload_len, 200);
        assert_eq!(env.digest, digest);
        assert_eq!(env.crypto, Some(sample_params()));
        assert_eq!(env.total_len(), 285);
        assert_eq!(env.to_bytes(), header);
    }

    #[test]
    fn crypto_flag_mismatch_rejected() {
        assert!(matches!(
            build_header(1, true, &[0u8; 32], None),
            Err(StegoError::InvalidCryptoParams)
        ));
        assert!(matches!(
            build_header(1, false, &[0u8; 32], Some(&sample_params())),
            Err(StegoError::InvalidCryptoParams)
        ));
    }

    #[test]
    fn prefix_reports_header_len() {
        let plain = build_header(9, false, &[0u8; 32], None).unwrap();
        let p = parse_prefix(&plain[..5]).unwrap();
        assert_eq!(p, EnvelopePrefix { encrypted: false, header_len: 41 });

        let enc = build_header(9, true, &[0u8; 32], Some(&sample_params())).unwrap();
        let p = parse_prefix(&enc[..5]).unwrap();
        assert_eq!(p, EnvelopePrefix { encrypted: true, header_len: 85 });
    }

    #[test]
    fn bad_magic_rejected() {
        let mut header = build_header(9, false, &[0u8; 32], None).unwrap();
        header[0] = b'X';
        assert!(matches!(parse_prefix(&header), Err(StegoError::InvalidMagic)));
        assert!(matches!(parse_full(&header), Err(StegoError::InvalidMagic)));
    }

    #[test]
    fn reserved_flag_bits_rejected() {
        let mut header = build_header(9, false, &[0u8; 32], None).unwrap();
        header[4] = 0x80;
        assert!(matches!(parse_prefix(&header), Err(StegoError::InvalidMagic)));
    }

    #[test]
    fn truncated_plain_header() {
        let header = build_header(5, false, &[0u8; 32], None).unwrap();
        match parse_full(&header[..40]) {
            Err(StegoError::TruncatedHeader { needed: 41, available: 40 }) => {}
            other => panic!("expected TruncatedHeader, got {other:?}"),
        }
        assert!(parse_full(&header[..41]).is_ok());
    }

    #[test]
    fn truncated_encrypted_header() {
        let header = build_header(5, true, &[0u8; 32], Some(&sample_params())).unwrap();
        // The plain-size prefix is not enough for an encrypted envelope.
        assert!(matches!(
            parse_full(&header[..41]),
            Err(StegoError::TruncatedHeader { needed: 85, available: 41 })
        ));
        assert!(matches!(
            parse_full(&header[..84]),
            Err(StegoError::TruncatedHeader { needed: 85, .. })
        ));
        assert!(parse_full(&header).is_ok());
    }

    #[test]
    fn header_followed_by_payload() {
        let mut data = build_header(5, false, &[0u8; 32], None).unwrap();
        data.extend_from_slice(b"HELLO");
        let env = parse_full(&data).unwrap();
        assert_eq!(env.payload_len, 5);
        assert_eq!(&data[env.header_len()..], b"HELLO");
    }

    #[test]
    fn prefix_too_short() {
        assert!(matches!(
            parse_prefix(b"PHS"),
            Err(StegoError::TruncatedHeader { needed: 5, available: 3 })
        ));
        assert!(matches!(parse_prefix(&[]), Err(StegoError::TruncatedHeader { .. })));
    }
}
