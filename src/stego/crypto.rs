// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Cryptographic primitives for payload encryption.
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256 with a fresh 16-byte random salt
//!   and [`PBKDF2_ROUNDS`] iterations, producing a 256-bit key.
//! - **Encryption**: AES-256-GCM-SIV with a fresh 96-bit random nonce. The
//!   16-byte authentication tag is kept detached so the ciphertext is exactly
//!   as long as the plaintext; salt, nonce and tag travel in the envelope.
//!
//! There is deliberately no entry point that takes a caller-chosen nonce:
//! every [`encrypt`] call draws its own salt and nonce.

use aes_gcm_siv::aead::AeadInPlace;
use aes_gcm_siv::{Aes256GcmSiv, Key, KeyInit, Nonce, Tag};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::stego::error::StegoError;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;
/// SHA-256 digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Parameters needed to reverse an [`encrypt`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoParams {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

/// Output of [`encrypt`]: ciphertext (same length as the plaintext) plus
/// the parameters the envelope must carry.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub params: CryptoParams,
}

/// Derive the AES-256 key from passphrase + salt.
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut *key);
    key
}

/// SHA-256 of `data`.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Encrypt plaintext with AES-256-GCM-SIV under a freshly derived key.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Sealed, StegoError> {
    use rand::RngCore;
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256GcmSiv::new(Key::<Aes256GcmSiv>::from_slice(&key[..]));

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut ciphertext)
        .map_err(|_| StegoError::InvalidCryptoParams)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        ciphertext,
        params: CryptoParams { salt, nonce: nonce_bytes, tag: tag_bytes },
    })
}

/// Decrypt ciphertext with AES-256-GCM-SIV.
///
/// Returns `StegoError::AuthenticationFailed` if the tag does not verify,
/// which covers both a wrong passphrase and corrupted ciphertext.
pub fn decrypt(
    ciphertext: &[u8],
    passphrase: &str,
    params: &CryptoParams,
) -> Result<Vec<u8>, StegoError> {
    let key = derive_key(passphrase, &params.salt);
    let cipher = Aes256GcmSiv::new(Key::<Aes256GcmSiv>::from_slice(&key[..]));

    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&params.nonce),
            b"",
            &mut plaintext,
            Tag::from_slice(&params.tag),
        )
        .map_err(|_| StegoError::AuthenticationFailed)?;
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let msg = b"Hello, steganography!";
        let passphrase = "secret123";

        let sealed = encrypt(msg, passphrase).unwrap();
        assert_eq!(sealed.ciphertext.len(), msg.len(), "tag must be detached");
        let pt = decrypt(&sealed.ciphertext, passphrase, &sealed.params).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let sealed = encrypt(b"secret message", "correct").unwrap();
        let result = decrypt(&sealed.ciphertext, "wrong", &sealed.params);
        assert!(matches!(result, Err(StegoError::AuthenticationFailed)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut sealed = encrypt(b"secret message", "pass").unwrap();
        sealed.ciphertext[3] ^= 0x40;
        let result = decrypt(&sealed.ciphertext, "pass", &sealed.params);
        assert!(matches!(result, Err(StegoError::AuthenticationFailed)));
    }

    #[test]
    fn tampered_tag_fails() {
        let mut sealed = encrypt(b"secret message", "pass").unwrap();
        sealed.params.tag[0] ^= 1;
        let result = decrypt(&sealed.ciphertext, "pass", &sealed.params);
        assert!(matches!(result, Err(StegoError::AuthenticationFailed)));
    }

    #[test]
    fn empty_message_works() {
        let sealed = encrypt(b"", "pass").unwrap();
        assert!(sealed.ciphertext.is_empty());
        let pt = decrypt(&sealed.ciphertext, "pass", &sealed.params).unwrap();
        assert!(pt.is_empty());
    }

    #[test]
    fn fresh_salt_and_nonce_per_call() {
        // Same plaintext and passphrase must still yield distinct parameters.
        let a = encrypt(b"same message", "pass").unwrap();
        let b = encrypt(b"same message", "pass").unwrap();
        assert_ne!(a.params.salt, b.params.salt);
        assert_ne!(a.params.nonce, b.params.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn key_differs_by_salt() {
        let key1 = derive_key("pass", &[0u8; SALT_LEN]);
        let key2 = derive_key("pass", &[1u8; SALT_LEN]);
        assert_ne!(key1, key2);
        assert_eq!(derive_key("pass", &[0u8; SALT_LEN]), key1);
    }

    #[test]
    fn digest_matches_known_vector() {
        // SHA-256("abc")
        let d = digest(b"abc");
        assert_eq!(d[..4], [0xba, 0x78, 0x16, 0xbf]);
        assert_eq!(d[28..], [0xf2, 0x00, 0x15, 0xad]);
    }
}
