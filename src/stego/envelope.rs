// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed-LSB payload envelope.
//!
//! ```text
//! [16 bytes] PBKDF2 salt
//! [16 bytes] AEAD nonce
//! [16 bytes] authentication tag
//! [N bytes ] ciphertext
//! ```
//!
//! Total length is `48 + N`. Anything shorter than 48 bytes cannot be an
//! envelope.

use crate::stego::error::StegoError;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AEAD nonce length in bytes.
pub const NONCE_LEN: usize = 16;
/// AEAD tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Fixed header: salt + nonce + tag = 48 bytes.
pub const ENVELOPE_HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEnvelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl PayloadEnvelope {
    /// Serialize as `salt || nonce || tag || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENVELOPE_HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a byte buffer into its envelope fields.
    ///
    /// # Errors
    /// [`StegoError::CorruptPayload`] if `data` is shorter than 48 bytes.
    pub fn parse(data: &[u8]) -> Result<Self, StegoError> {
        if data.len() < ENVELOPE_HEADER_LEN {
            return Err(StegoError::CorruptPayload);
        }
        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        Ok(Self {
            salt: salt.try_into().map_err(|_| StegoError::CorruptPayload)?,
            nonce: nonce.try_into().map_err(|_| StegoError::CorruptPayload)?,
            tag: tag.try_into().map_err(|_| StegoError::CorruptPayload)?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}
