// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Steganographic embedding and extraction.
//!
//! Four schemes share one boundary:
//!
//! - **LSB** (`lsb`): plain text in the least significant bits of RGB
//!   samples, terminated by `0xFF 0xFE`.
//! - **Keyed LSB** (`lsb-keyed`): the secret is sealed with
//!   PBKDF2 + AES-256-GCM, base64-armored, then embedded as LSB text.
//! - **DCT** (`invisible_dct`): keyed mid-frequency coefficient ordering
//!   in 8x8 luma blocks.
//! - **DWT** (`invisible_dwt`): keyed QIM on Haar HL coefficients.
//!
//! [`embed`] and [`extract`] validate input and then dispatch through a
//! single match on [`Algorithm`]. Each scheme also implements [`Codec`] for
//! callers that want to hold a configured codec.

pub mod bits;
pub mod capacity;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keyed_lsb;
pub mod lsb;
pub mod permute;

use core::fmt;
use core::str::FromStr;

use tracing::debug;

use crate::carrier::Carrier;
use crate::watermark::{dct, dwt};

pub use envelope::PayloadEnvelope;
pub use error::StegoError;

/// Embedding scheme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Lsb,
    KeyedLsb,
    Dct,
    Dwt,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Self::Lsb, Self::KeyedLsb, Self::Dct, Self::Dwt];

    /// Wire name used by clients.
    pub fn name(self) -> &'static str {
        match self {
            Self::Lsb => "lsb",
            Self::KeyedLsb => "lsb-keyed",
            Self::Dct => "invisible_dct",
            Self::Dwt => "invisible_dwt",
        }
    }

    /// Whether a non-empty password or watermark key is mandatory.
    pub fn requires_key(self) -> bool {
        !matches!(self, Self::Lsb)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`Algorithm::from_str`] for an unrecognized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm: {:?}", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsb" => Ok(Self::Lsb),
            "lsb-keyed" | "lsb_keyed" => Ok(Self::KeyedLsb),
            "invisible_dct" | "dct" => Ok(Self::Dct),
            "invisible_dwt" | "dwt" => Ok(Self::Dwt),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Common capability of every embedding scheme.
pub trait Codec {
    /// Hide `secret` in a copy of `carrier`.
    fn embed(&self, carrier: &Carrier, secret: &str) -> Result<Carrier, StegoError>;

    /// Recover the hidden text.
    fn extract(&self, carrier: &Carrier) -> Result<String, StegoError>;

    /// Raw payload capacity in bits for a `width x height` carrier,
    /// terminator included.
    fn capacity_bits(&self, width: usize, height: usize) -> usize;
}

/// Unkeyed LSB.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsbCodec;

impl Codec for LsbCodec {
    fn embed(&self, carrier: &Carrier, secret: &str) -> Result<Carrier, StegoError> {
        lsb::embed(carrier, secret)
    }

    fn extract(&self, carrier: &Carrier) -> Result<String, StegoError> {
        lsb::extract(carrier)
    }

    fn capacity_bits(&self, width: usize, height: usize) -> usize {
        capacity::lsb_capacity_bytes(width, height) * 8
    }
}

/// Encrypt-then-LSB under a password.
#[derive(Debug, Clone, Copy)]
pub struct KeyedLsbCodec<'a> {
    pub password: &'a str,
}

impl Codec for KeyedLsbCodec<'_> {
    fn embed(&self, carrier: &Carrier, secret: &str) -> Result<Carrier, StegoError> {
        keyed_lsb::embed(carrier, secret, self.password)
    }

    fn extract(&self, carrier: &Carrier) -> Result<String, StegoError> {
        keyed_lsb::extract(carrier, self.password)
    }

    fn capacity_bits(&self, width: usize, height: usize) -> usize {
        capacity::lsb_capacity_bytes(width, height) * 8
    }
}

/// Keyed DCT coefficient-pair watermark.
#[derive(Debug, Clone, Copy)]
pub struct DctCodec<'a> {
    pub key: &'a str,
}

impl Codec for DctCodec<'_> {
    fn embed(&self, carrier: &Carrier, secret: &str) -> Result<Carrier, StegoError> {
        dct::embed(carrier, self.key, secret)
    }

    fn extract(&self, carrier: &Carrier) -> Result<String, StegoError> {
        dct::extract(carrier, self.key)
    }

    fn capacity_bits(&self, width: usize, height: usize) -> usize {
        capacity::dct_capacity_bits(width, height)
    }
}

/// Keyed Haar-wavelet QIM watermark.
#[derive(Debug, Clone, Copy)]
pub struct DwtCodec<'a> {
    pub key: &'a str,
}

impl Codec for DwtCodec<'_> {
    fn embed(&self, carrier: &Carrier, secret: &str) -> Result<Carrier, StegoError> {
        dwt::embed(carrier, self.key, secret)
    }

    fn extract(&self, carrier: &Carrier) -> Result<String, StegoError> {
        dwt::extract(carrier, self.key)
    }

    fn capacity_bits(&self, width: usize, height: usize) -> usize {
        capacity::dwt_payload_bits(width, height)
    }
}

/// Build the codec for `algorithm`. `key` is ignored for plain LSB.
pub fn codec<'a>(algorithm: Algorithm, key: &'a str) -> Box<dyn Codec + 'a> {
    match algorithm {
        Algorithm::Lsb => Box::new(LsbCodec),
        Algorithm::KeyedLsb => Box::new(KeyedLsbCodec { password: key }),
        Algorithm::Dct => Box::new(DctCodec { key }),
        Algorithm::Dwt => Box::new(DwtCodec { key }),
    }
}

fn check_key(algorithm: Algorithm, key: &str) -> Result<(), StegoError> {
    if algorithm.requires_key() && key.is_empty() {
        return Err(StegoError::PasswordRequired);
    }
    Ok(())
}

/// Embed `secret` with the chosen scheme.
///
/// # Errors
/// - [`StegoError::EmptySecret`] if `secret` is empty or whitespace only.
/// - [`StegoError::PasswordRequired`] if the scheme is keyed and `key` is empty.
/// - [`StegoError::CapacityExceeded`] if the payload does not fit.
/// - [`StegoError::WatermarkClipped`] if a DCT/DWT watermark cannot be made
///   readable because the carrier saturates.
pub fn embed(
    carrier: &Carrier,
    algorithm: Algorithm,
    secret: &str,
    key: &str,
) -> Result<Carrier, StegoError> {
    if secret.trim().is_empty() {
        return Err(StegoError::EmptySecret);
    }
    check_key(algorithm, key)?;

    debug!(%algorithm, width = carrier.width(), height = carrier.height(), "embed");
    codec(algorithm, key).embed(carrier, secret)
}

/// Extract the hidden text with the chosen scheme.
///
/// An empty recovered message is reported as
/// [`StegoError::NoHiddenMessage`].
pub fn extract(carrier: &Carrier, algorithm: Algorithm, key: &str) -> Result<String, StegoError> {
    check_key(algorithm, key)?;

    debug!(%algorithm, width = carrier.width(), height = carrier.height(), "extract");
    let text = codec(algorithm, key).extract(carrier)?;
    if text.is_empty() {
        return Err(StegoError::NoHiddenMessage);
    }
    Ok(text)
}

/// Raw capacity in bits of `carrier` under `algorithm`.
pub fn capacity_bits(carrier: &Carrier, algorithm: Algorithm) -> usize {
    codec(algorithm, "").capacity_bits(carrier.width(), carrier.height())
}

/// Longest secret, in UTF-8 bytes, that fits in `carrier` under `algorithm`.
pub fn max_secret_bytes(carrier: &Carrier, algorithm: Algorithm) -> usize {
    let (w, h) = (carrier.width(), carrier.height());
    match algorithm {
        Algorithm::Lsb => capacity::lsb_max_text_bytes(w, h),
        Algorithm::KeyedLsb => capacity::keyed_lsb_max_secret_bytes(w, h),
        Algorithm::Dct => capacity::transform_max_text_bytes(capacity::dct_capacity_bits(w, h)),
        Algorithm::Dwt => capacity::transform_max_text_bytes(capacity::dwt_payload_bits(w, h)),
    }
}
