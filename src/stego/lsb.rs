// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Spatial-domain LSB embedding.
//!
//! One payload bit goes into the least significant bit of each color
//! sample, pixel-major, channel order R,G,B. Because the carrier buffer is
//! already interleaved in that order, bit `i` lands in byte `i`.
//!
//! The payload is the UTF-8 text followed by [`LSB_TERMINATOR`]. Samples
//! past the last payload bit are left untouched.

use tracing::debug;

use crate::carrier::Carrier;
use crate::stego::bits::{self, Utf8Policy, LSB_TERMINATOR};
use crate::stego::capacity::lsb_capacity_bytes;
use crate::stego::error::StegoError;

/// Write `bits` into the LSBs of the first `bits.len()` samples.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the bit count (in whole bytes)
/// exceeds [`lsb_capacity_bytes`].
pub fn embed_bits(carrier: &Carrier, bits: &[u8]) -> Result<Carrier, StegoError> {
    let available = lsb_capacity_bytes(carrier.width(), carrier.height());
    let needed = bits.len().div_ceil(8);
    if needed > available {
        return Err(StegoError::CapacityExceeded { needed, available });
    }

    let mut out = carrier.clone();
    for (sample, &bit) in out.as_bytes_mut().iter_mut().zip(bits) {
        *sample = (*sample & !1) | (bit & 1);
    }
    Ok(out)
}

/// Embed `text` plus the terminator.
pub fn embed(carrier: &Carrier, text: &str) -> Result<Carrier, StegoError> {
    let mut payload = Vec::with_capacity(text.len() + LSB_TERMINATOR.len());
    payload.extend_from_slice(text.as_bytes());
    payload.extend_from_slice(&LSB_TERMINATOR);
    let bits = bits::bytes_to_bits(&payload);

    debug!(
        width = carrier.width(),
        height = carrier.height(),
        payload_bits = bits.len(),
        "lsb embed"
    );
    embed_bits(carrier, &bits)
}

/// Read LSBs in embedding order until the terminator is seen.
///
/// The terminator is matched on byte boundaries. Undecodable bytes in the
/// recovered prefix are dropped.
///
/// # Errors
/// [`StegoError::NoHiddenMessage`] if the carrier is exhausted first.
pub fn extract(carrier: &Carrier) -> Result<String, StegoError> {
    let mut bytes: Vec<u8> = Vec::new();
    for chunk in carrier.as_bytes().chunks_exact(8) {
        bytes.push(chunk.iter().fold(0u8, |acc, &s| (acc << 1) | (s & 1)));
        if bytes.ends_with(&LSB_TERMINATOR) {
            bytes.truncate(bytes.len() - LSB_TERMINATOR.len());
            debug!(payload_bytes = bytes.len(), "lsb terminator found");
            return bits::decode_text(bytes, Utf8Policy::Lenient);
        }
    }
    Err(StegoError::NoHiddenMessage)
}

/// Raw LSB byte stream with no terminator search, capped at `max_bytes`.
///
/// Trailing samples that do not fill a whole byte are ignored.
pub fn raw_bytes(carrier: &Carrier, max_bytes: usize) -> Vec<u8> {
    carrier
        .as_bytes()
        .chunks_exact(8)
        .take(max_bytes)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &s| (acc << 1) | (s & 1)))
        .collect()
}
