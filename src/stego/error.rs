// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the embedding and extraction codecs.
//!
//! [`StegoError`] covers every terminal failure of an embed/extract call.
//! Errors are never retried internally; callers get a stable kind string
//! via [`StegoError::kind`].

use core::fmt;

/// Errors that can occur during embedding or extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// The payload does not fit. Sizes are in the codec's native unit
    /// (bytes for LSB, bits for DCT/DWT).
    CapacityExceeded { needed: usize, available: usize },
    /// The carrier has the wrong color mode, is too small, or is undecodable.
    InvalidCarrierFormat(String),
    /// The terminator never appeared before the carrier was exhausted.
    NoHiddenMessage,
    /// The bit stream length is not a multiple of 8.
    NotByteAligned,
    /// The reassembled bytes are not valid UTF-8.
    InvalidUtf8,
    /// The extracted envelope is shorter than salt + nonce + tag.
    CorruptPayload,
    /// Authentication failed. Wrong password and tampering are reported
    /// identically.
    InvalidPasswordOrCorruptPayload,
    /// The secret is empty or whitespace only.
    EmptySecret,
    /// A password or watermark key is required but was empty.
    PasswordRequired,
    /// Pixel clipping kept some watermark bits from reading back as
    /// written. Typical for saturated or high-contrast carriers.
    WatermarkClipped { unreadable_bits: usize },
}

impl StegoError {
    /// Stable machine-readable kind, suitable for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "CapacityExceeded",
            Self::InvalidCarrierFormat(_) => "InvalidCarrierFormat",
            Self::NoHiddenMessage => "NoHiddenMessage",
            Self::NotByteAligned => "NotByteAligned",
            Self::InvalidUtf8 => "InvalidUtf8",
            Self::CorruptPayload => "CorruptPayload",
            Self::InvalidPasswordOrCorruptPayload => "InvalidPasswordOrCorruptPayload",
            Self::EmptySecret => "EmptySecret",
            Self::PasswordRequired => "PasswordRequired",
            Self::WatermarkClipped { .. } => "WatermarkClipped",
        }
    }
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { needed, available } => {
                write!(f, "payload too large for carrier (needs {needed}, max {available})")
            }
            Self::InvalidCarrierFormat(msg) => write!(f, "invalid carrier: {msg}"),
            Self::NoHiddenMessage => write!(f, "no hidden message found"),
            Self::NotByteAligned => write!(f, "bit stream is not byte aligned"),
            Self::InvalidUtf8 => write!(f, "extracted text is not valid UTF-8"),
            Self::CorruptPayload => write!(f, "corrupted encrypted payload"),
            Self::InvalidPasswordOrCorruptPayload => {
                write!(f, "invalid password or corrupted stego image")
            }
            Self::EmptySecret => write!(f, "secret message cannot be empty"),
            Self::PasswordRequired => write!(f, "password is required"),
            Self::WatermarkClipped { unreadable_bits } => {
                write!(f, "carrier clips the watermark ({unreadable_bits} bits unreadable)")
            }
        }
    }
}

impl std::error::Error for StegoError {}

impl From<image::ImageError> for StegoError {
    fn from(e: image::ImageError) -> Self {
        Self::InvalidCarrierFormat(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_reports_max() {
        let e = StegoError::CapacityExceeded { needed: 120, available: 96 };
        let msg = e.to_string();
        assert!(msg.contains("120"));
        assert!(msg.contains("96"));
        assert_eq!(e.kind(), "CapacityExceeded");
    }

    #[test]
    fn auth_failure_is_opaque() {
        let msg = StegoError::InvalidPasswordOrCorruptPayload.to_string();
        assert!(!msg.contains("tag"));
        assert!(msg.contains("invalid password"));
    }

    #[test]
    fn clipped_watermark_reports_count() {
        let e = StegoError::WatermarkClipped { unreadable_bits: 3 };
        assert_eq!(e.kind(), "WatermarkClipped");
        assert!(e.to_string().contains("3 bits unreadable"));
    }
}
