// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Property tests: random payloads, covers and parameters.
//!
//! Encryption is left out here (100k-round key derivation per case); the
//! encrypted paths are covered in `roundtrip.rs`.

use phasm_raster::stego::bits::{bits_to_bytes, bytes_to_bits};
use phasm_raster::stego::crypto::{CryptoParams, DIGEST_LEN};
use phasm_raster::stego::engine::pvd;
use phasm_raster::stego::envelope;
use phasm_raster::{decode, encode, Algorithm, Channel, PixelBuffer, StegoOptions};
use proptest::collection::vec;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn cover(width: u32, height: u32, seed: u64, range: std::ops::RangeInclusive<u8>) -> PixelBuffer {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let data = (0..width as usize * height as usize * 3)
        .map(|_| rng.gen_range(range.clone()))
        .collect();
    PixelBuffer::new(width, height, 3, data).unwrap()
}

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bits_bytes_inverse(bytes in vec(any::<u8>(), 0..64)) {
        let bits = bytes_to_bits(&bytes);
        prop_assert_eq!(bits.len(), bytes.len() * 8);
        prop_assert!(bits.iter().all(|&b| b <= 1));
        prop_assert_eq!(bits_to_bytes(&bits), bytes);
    }

    #[test]
    fn envelope_parse_inverts_build(
        payload_len in any::<u32>(),
        digest in prop::array::uniform32(any::<u8>()),
        salt in prop::array::uniform16(any::<u8>()),
        nonce in prop::array::uniform12(any::<u8>()),
        tag in prop::array::uniform16(any::<u8>()),
        encrypted in any::<bool>(),
    ) {
        let params = encrypted.then_some(CryptoParams { salt, nonce, tag });
        let header = envelope::build_header(payload_len, encrypted, &digest, params.as_ref()).unwrap();
        prop_assert_eq!(header.len(), if encrypted { 85 } else { 41 });

        let env = envelope::parse_full(&header).unwrap();
        prop_assert_eq!(env.payload_len, payload_len);
        prop_assert_eq!(env.digest.len(), DIGEST_LEN);
        prop_assert_eq!(env.digest, digest);
        prop_assert_eq!(env.crypto, params);
    }

    #[test]
    fn plain_roundtrip(
        algorithm in algorithm(),
        payload in vec(any::<u8>(), 0..48),
        seed in any::<u64>(),
    ) {
        let options = StegoOptions::new(algorithm);
        let out = encode(cover(64, 48, seed, 32..=224), &payload, &options).unwrap();
        prop_assert_eq!(out.metrics.used_bits, (41 + payload.len()) * 8);
        let decoded = decode(&out.pixels, &options).unwrap();
        prop_assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn lsb_any_depth_and_channels(
        bits_per_channel in 1u8..=8,
        channels in prop::sample::subsequence(Channel::RGB.to_vec(), 1..=3).prop_shuffle(),
        payload in vec(any::<u8>(), 0..120),
        seed in any::<u64>(),
    ) {
        let options = StegoOptions::new(Algorithm::Lsb).with_lsb(bits_per_channel, channels);
        let out = encode(cover(40, 40, seed, 0..=255), &payload, &options).unwrap();
        prop_assert_eq!(decode(&out.pixels, &options).unwrap().payload, payload);
    }

    #[test]
    fn pvd_full_range_pairs_decode_exactly(seed in any::<u64>(), bit_seed in any::<u64>()) {
        let px = cover(17, 6, seed, 0..=255);
        let cap = pvd::capacity(&px).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(bit_seed);
        let len = rng.gen_range(0..=cap);
        let bits: Vec<u8> = (0..len).map(|_| rng.gen_range(0..=1)).collect();

        let stego = pvd::embed(px, &bits).unwrap();
        prop_assert_eq!(pvd::capacity(&stego).unwrap(), cap);
        prop_assert_eq!(pvd::extract(&stego, len).unwrap(), bits);
    }
}
