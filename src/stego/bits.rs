// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Text <-> bit stream conversion and terminator patterns.
//!
//! A bit stream is a `Vec<u8>` holding one bit (0 or 1) per element, MSB
//! first within each byte. Text is always UTF-8 encoded before conversion.

use crate::stego::error::StegoError;

/// End-of-payload marker for the LSB schemes: bytes `0xFF 0xFE`.
///
/// Neither byte can occur in well-formed UTF-8, so a byte-aligned search
/// never stops early inside the payload.
pub const LSB_TERMINATOR: [u8; 2] = [0xFF, 0xFE];

/// End-of-payload marker for the transform codecs: one all-zero byte.
pub const NUL_TERMINATOR: u8 = 0x00;

/// How [`from_bits`] treats byte sequences that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Policy {
    /// Fail with [`StegoError::InvalidUtf8`].
    Strict,
    /// Silently drop undecodable bytes.
    Lenient,
}

/// Expand bytes into bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Pack bits (MSB first) back into bytes.
///
/// # Errors
/// [`StegoError::NotByteAligned`] if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Result<Vec<u8>, StegoError> {
    if bits.len() % 8 != 0 {
        return Err(StegoError::NotByteAligned);
    }
    Ok(bits.chunks_exact(8).map(pack_byte).collect())
}

/// Pack exactly eight bits into one byte.
pub(crate) fn pack_byte(chunk: &[u8]) -> u8 {
    debug_assert_eq!(chunk.len(), 8);
    chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1))
}

/// UTF-8 encode `text` and expand to bits.
pub fn to_bits(text: &str) -> Vec<u8> {
    bytes_to_bits(text.as_bytes())
}

/// Reassemble bits into text under the given policy.
pub fn from_bits(bits: &[u8], policy: Utf8Policy) -> Result<String, StegoError> {
    let bytes = bits_to_bytes(bits)?;
    decode_text(bytes, policy)
}

/// Decode raw bytes as UTF-8 under the given policy.
pub fn decode_text(bytes: Vec<u8>, policy: Utf8Policy) -> Result<String, StegoError> {
    match policy {
        Utf8Policy::Strict => String::from_utf8(bytes).map_err(|_| StegoError::InvalidUtf8),
        Utf8Policy::Lenient => Ok(decode_lossy_dropping(&bytes)),
    }
}

/// Like `String::from_utf8_lossy`, but drops invalid sequences instead of
/// substituting U+FFFD.
fn decode_lossy_dropping(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // Safe: the prefix was just validated.
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(n) => bytes = &rest[n..],
                    None => return out, // truncated sequence at the end
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bits_are_big_endian() {
        assert_eq!(to_bits("A"), vec![0, 1, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn multibyte_roundtrip() {
        let text = "héllo 日本 🔐";
        let bits = to_bits(text);
        assert_eq!(bits.len(), text.len() * 8);
        assert_eq!(from_bits(&bits, Utf8Policy::Strict).unwrap(), text);
    }

    #[test]
    fn unaligned_rejected() {
        let err = from_bits(&[1, 0, 1], Utf8Policy::Lenient).unwrap_err();
        assert_eq!(err, StegoError::NotByteAligned);
    }

    #[test]
    fn strict_rejects_invalid_utf8() {
        let bits = bytes_to_bits(&[b'o', b'k', 0xC3]);
        assert_eq!(from_bits(&bits, Utf8Policy::Strict), Err(StegoError::InvalidUtf8));
    }

    #[test]
    fn lenient_drops_invalid_bytes() {
        let bits = bytes_to_bits(&[b'a', 0xFF, b'b', 0xE6, 0x97, b'c', 0xF0]);
        assert_eq!(from_bits(&bits, Utf8Policy::Lenient).unwrap(), "abc");
    }

    #[test]
    fn terminator_bytes_are_never_utf8() {
        for b in LSB_TERMINATOR {
            assert!(std::str::from_utf8(&[b]).is_err());
        }
        assert_eq!(
            bytes_to_bits(&LSB_TERMINATOR),
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0]
        );
    }
}
