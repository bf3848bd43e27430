// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed LSB: encrypt-then-embed.
//!
//! The secret is sealed into a [`PayloadEnvelope`], armored as standard
//! base64 so the LSB terminator can never occur inside it, and handed to
//! the plain LSB engine. Extraction reverses the steps. Once a terminator
//! has been found, every failure collapses to
//! [`StegoError::InvalidPasswordOrCorruptPayload`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::carrier::Carrier;
use crate::stego::crypto;
use crate::stego::envelope::PayloadEnvelope;
use crate::stego::error::StegoError;
use crate::stego::lsb;

/// Encrypt `secret` under `password` and embed it.
///
/// # Errors
/// - [`StegoError::EmptySecret`] / [`StegoError::PasswordRequired`] on empty input.
/// - [`StegoError::CapacityExceeded`] if the armored envelope does not fit.
pub fn embed(carrier: &Carrier, secret: &str, password: &str) -> Result<Carrier, StegoError> {
    if secret.is_empty() {
        return Err(StegoError::EmptySecret);
    }
    if password.is_empty() {
        return Err(StegoError::PasswordRequired);
    }

    let envelope = crypto::seal(secret.as_bytes(), password)?;
    let armored = STANDARD.encode(envelope.to_bytes());
    debug!(armored_len = armored.len(), "keyed lsb envelope sealed");

    lsb::embed(carrier, &armored)
}

/// Extract and decrypt a secret embedded by [`embed`].
///
/// # Errors
/// - [`StegoError::PasswordRequired`] if `password` is empty.
/// - [`StegoError::NoHiddenMessage`] if no terminator is found or the
///   recovered payload is empty.
/// - [`StegoError::InvalidPasswordOrCorruptPayload`] for everything else.
pub fn extract(carrier: &Carrier, password: &str) -> Result<String, StegoError> {
    if password.is_empty() {
        return Err(StegoError::PasswordRequired);
    }

    let armored = lsb::extract(carrier)?;
    if armored.is_empty() {
        return Err(StegoError::NoHiddenMessage);
    }

    open_armored(&armored, password).map_err(|e| {
        debug!(kind = e.kind(), "keyed lsb open failed");
        StegoError::InvalidPasswordOrCorruptPayload
    })
}

fn open_armored(armored: &str, password: &str) -> Result<String, StegoError> {
    let raw = STANDARD.decode(armored).map_err(|_| StegoError::CorruptPayload)?;
    let envelope = PayloadEnvelope::parse(&raw)?;
    let plaintext = crypto::open(&envelope, password)?;
    String::from_utf8(plaintext.to_vec()).map_err(|_| StegoError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover() -> Carrier {
        Carrier::from_fn(40, 40, |x, y| [(x * 6) as u8, (y * 6) as u8, 90]).unwrap()
    }

    #[test]
    fn roundtrip() {
        let stego = embed(&cover(), "attack at dawn", "hunter2").unwrap();
        assert_eq!(extract(&stego, "hunter2").unwrap(), "attack at dawn");
    }

    #[test]
    fn wrong_password_is_opaque() {
        let stego = embed(&cover(), "attack at dawn", "hunter2").unwrap();
        assert_eq!(extract(&stego, "hunter3"), Err(StegoError::InvalidPasswordOrCorruptPayload));
    }

    #[test]
    fn plain_lsb_payload_is_rejected() {
        let stego = lsb::embed(&cover(), "not an envelope").unwrap();
        assert_eq!(extract(&stego, "pw"), Err(StegoError::InvalidPasswordOrCorruptPayload));
    }

    #[test]
    fn input_validation() {
        assert_eq!(embed(&cover(), "", "pw"), Err(StegoError::EmptySecret));
        assert_eq!(embed(&cover(), "s", ""), Err(StegoError::PasswordRequired));
        assert_eq!(extract(&cover(), ""), Err(StegoError::PasswordRequired));
    }

    #[test]
    fn armored_payload_is_ascii() {
        let stego = embed(&cover(), "ü", "pw").unwrap();
        let armored = lsb::extract(&stego).unwrap();
        assert!(armored.is_ascii());
        // 48-byte header + 2-byte secret -> 50 bytes -> 68 base64 chars.
        assert_eq!(armored.len(), 68);
    }
}
