// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Codec configuration.
//!
//! [`StegoOptions`] mirrors the option object the surrounding service
//! accepts (`{ algorithm, bitsPerChannel, channels, passphrase }`) and
//! deserializes from it directly. `bitsPerChannel` and `channels` only
//! matter to LSB; the other engines ignore them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::raster::Channel;
use crate::stego::engine::{Engine, LsbParams};
use crate::stego::error::StegoError;

/// Embedding algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Lsb,
    Dct,
    Dwt,
    Pvd,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Algorithm::Lsb, Algorithm::Dct, Algorithm::Dwt, Algorithm::Pvd];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Lsb => "lsb",
            Algorithm::Dct => "dct",
            Algorithm::Dwt => "dwt",
            Algorithm::Pvd => "pvd",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(StegoError::InvalidOptions("unknown algorithm (expected lsb, dct, dwt or pvd)"))
    }
}

fn default_bits_per_channel() -> u8 {
    1
}

fn default_channels() -> Vec<Channel> {
    Channel::RGB.to_vec()
}

/// Options for [`encode`](crate::stego::encode) and [`decode`](crate::stego::decode).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StegoOptions {
    pub algorithm: Algorithm,
    /// LSB only: low bits replaced per selected channel (1–8).
    #[serde(default = "default_bits_per_channel", alias = "bits_per_channel")]
    pub bits_per_channel: u8,
    /// LSB only: channels to embed into, in embedding order.
    #[serde(default = "default_channels")]
    pub channels: Vec<Channel>,
    /// Enables encryption on encode; required to decode an encrypted image.
    #[serde(default, skip_serializing)]
    pub passphrase: Option<String>,
}

impl StegoOptions {
    /// Unencrypted options with LSB defaults (1 bit, R/G/B).
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            bits_per_channel: default_bits_per_channel(),
            channels: default_channels(),
            passphrase: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn with_lsb(mut self, bits_per_channel: u8, channels: Vec<Channel>) -> Self {
        self.bits_per_channel = bits_per_channel;
        self.channels = channels;
        self
    }

    /// The passphrase, if one was given. An empty string counts as none.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().filter(|p| !p.is_empty())
    }

    /// Validate the options and build the engine they select.
    ///
    /// # Errors
    /// [`StegoError::InvalidOptions`] for LSB parameters out of range.
    pub fn engine(&self) -> Result<Engine, StegoError> {
        Ok(match self.algorithm {
            Algorithm::Lsb => Engine::Lsb(LsbParams::new(self.bits_per_channel, self.channels.clone())?),
            Algorithm::Dct => Engine::Dct,
            Algorithm::Dwt => Engine::Dwt,
            Algorithm::Pvd => Engine::Pvd,
        })
    }
}

impl fmt::Debug for StegoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StegoOptions")
            .field("algorithm", &self.algorithm)
            .field("bits_per_channel", &self.bits_per_channel)
            .field("channels", &self.channels)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
