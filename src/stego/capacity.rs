// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Capacity formulas for pre-flight validation.
//!
//! All formulas depend only on the carrier dimensions, never on padded
//! sizes or stored metadata, so embed and extract derive identical values.
//!
//! | Scheme    | Capacity                        | Unit  |
//! |-----------|---------------------------------|-------|
//! | LSB       | `floor(w * h * 3 / 8)`          | bytes |
//! | DCT       | `floor(h / 8) * floor(w / 8)`   | bits  |
//! | DWT       | `floor(h / 2) * floor(w / 2)`   | bits  |
//!
//! DWT payloads are further limited to [`DWT_MAX_PAYLOAD_BITS`], the most
//! coefficients extraction will scan.

use crate::stego::bits::LSB_TERMINATOR;
use crate::stego::envelope::ENVELOPE_HEADER_LEN;

/// Side length of a DCT block.
pub const DCT_BLOCK: usize = 8;

/// LSB capacity in bytes, terminator included.
pub fn lsb_capacity_bytes(width: usize, height: usize) -> usize {
    width * height * 3 / 8
}

/// Number of whole 8x8 blocks inside the original image: one bit each.
pub fn dct_capacity_bits(width: usize, height: usize) -> usize {
    (height / DCT_BLOCK) * (width / DCT_BLOCK)
}

/// Number of HL coefficients backed by real pixels: one bit each.
pub fn dwt_capacity_bits(width: usize, height: usize) -> usize {
    (height / 2) * (width / 2)
}

/// Most DWT coefficients a payload may occupy, terminator included.
pub const DWT_MAX_PAYLOAD_BITS: usize = 10_000;

/// DWT bits a payload may actually use: the coefficient count, capped at
/// [`DWT_MAX_PAYLOAD_BITS`].
pub fn dwt_payload_bits(width: usize, height: usize) -> usize {
    dwt_capacity_bits(width, height).min(DWT_MAX_PAYLOAD_BITS)
}

/// Longest UTF-8 text (in bytes) the plain LSB scheme can carry.
pub fn lsb_max_text_bytes(width: usize, height: usize) -> usize {
    lsb_capacity_bytes(width, height).saturating_sub(LSB_TERMINATOR.len())
}

/// Longest secret (in bytes) the keyed LSB scheme can carry after the
/// envelope header and base64 armoring.
pub fn keyed_lsb_max_secret_bytes(width: usize, height: usize) -> usize {
    let armored_budget = lsb_max_text_bytes(width, height);
    // base64 turns every 3 raw bytes into 4 characters.
    let raw_budget = armored_budget / 4 * 3;
    raw_budget.saturating_sub(ENVELOPE_HEADER_LEN)
}

/// Longest text (in bytes) a transform codec with `capacity_bits` can carry,
/// leaving room for the one-byte terminator.
pub fn transform_max_text_bytes(capacity_bits: usize) -> usize {
    (capacity_bits / 8).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formulas_use_floor() {
        assert_eq!(lsb_capacity_bytes(257, 257), 257 * 257 * 3 / 8);
        assert_eq!(lsb_capacity_bytes(1, 2), 0);
        assert_eq!(dct_capacity_bits(17, 23), 2 * 2);
        assert_eq!(dct_capacity_bits(7, 100), 0);
        assert_eq!(dwt_capacity_bits(9, 7), 3 * 4);
    }

    #[test]
    fn dwt_payload_is_capped() {
        assert_eq!(dwt_payload_bits(9, 7), 12);
        assert_eq!(dwt_capacity_bits(256, 256), 128 * 128);
        assert_eq!(dwt_payload_bits(256, 256), DWT_MAX_PAYLOAD_BITS);
        assert_eq!(transform_max_text_bytes(dwt_payload_bits(256, 256)), 1249);
    }

    #[test]
    fn text_limits() {
        assert_eq!(lsb_max_text_bytes(4, 4), 4);
        assert_eq!(transform_max_text_bytes(64), 7);
        assert_eq!(transform_max_text_bytes(7), 0);
    }

    #[test]
    fn keyed_limit_is_below_plain_limit() {
        let plain = lsb_max_text_bytes(100, 100);
        let keyed = keyed_lsb_max_secret_bytes(100, 100);
        assert!(keyed < plain);
        assert_eq!(keyed_lsb_max_secret_bytes(4, 4), 0);
    }
}
