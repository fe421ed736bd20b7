// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # phasm-raster
//!
//! Pure-Rust steganography engine for hiding byte payloads in raw RGB/RGBA
//! rasters. Four embedding strategies share one envelope format:
//!
//! - **LSB**: spatial least-significant-bit replacement.
//! - **DCT**: quantization parity of 8×8 block coefficients.
//! - **DWT**: quantization parity of the Haar HH subband.
//! - **PVD**: pixel-value differencing over horizontal pairs.
//!
//! A passphrase enables AES-256-GCM-SIV encryption with a PBKDF2-SHA256
//! derived key. Every payload carries a SHA-256 digest that is verified on
//! decode. Image file formats are the caller's business: the engine only
//! sees and produces interleaved 8-bit samples.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use phasm_raster::{decode, encode, Algorithm, PixelBuffer, StegoOptions};
//!
//! let cover = PixelBuffer::new(width, height, 4, rgba_samples)?;
//! let options = StegoOptions::new(Algorithm::Dwt).with_passphrase("correct horse");
//! let out = encode(cover, b"secret message", &options)?;
//! let decoded = decode(&out.pixels, &options)?;
//! assert_eq!(decoded.payload, b"secret message");
//! ```

pub mod raster;
pub mod stego;

pub use raster::{Channel, PixelBuffer};
pub use stego::{capacity, decode, encode, min_dimensions, Algorithm, CapacityInfo, StegoError, StegoOptions};
pub use stego::{DecodeOutput, EncodeMetrics, EncodeOutput, Engine, Stage};
