// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Password-based authenticated encryption for the keyed LSB scheme.
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256, 100 000 iterations, random
//!   16-byte salt per message.
//! - **Cipher**: AES-256-GCM with a 16-byte random nonce and a detached
//!   16-byte tag, so the output maps directly onto [`PayloadEnvelope`].
//!
//! Decryption failures never distinguish a wrong password from a modified
//! ciphertext.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::stego::envelope::{PayloadEnvelope, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::stego::error::StegoError;

/// PBKDF2 work factor.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// AES-256-GCM with a 128-bit nonce.
type EnvelopeCipher = AesGcm<Aes256, U16>;

/// Derive the AES key from a password and salt.
pub fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

fn cipher_for(password: &str, salt: &[u8]) -> EnvelopeCipher {
    let key = derive_key(password, salt);
    EnvelopeCipher::new(GenericArray::from_slice(&key[..]))
}

/// Encrypt with a fresh random salt and nonce.
pub fn seal(plaintext: &[u8], password: &str) -> Result<PayloadEnvelope, StegoError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    seal_with(plaintext, password, salt, nonce)
}

/// Encrypt with caller-provided salt and nonce.
pub fn seal_with(
    plaintext: &[u8],
    password: &str,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
) -> Result<PayloadEnvelope, StegoError> {
    let cipher = cipher_for(password, &salt);
    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| StegoError::CorruptPayload)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(PayloadEnvelope { salt, nonce, tag: tag_bytes, ciphertext })
}

/// Decrypt and authenticate an envelope.
///
/// # Errors
/// [`StegoError::InvalidPasswordOrCorruptPayload`] on any authentication
/// failure.
pub fn open(envelope: &PayloadEnvelope, password: &str) -> Result<Zeroizing<Vec<u8>>, StegoError> {
    let cipher = cipher_for(password, &envelope.salt);
    let mut buffer = Zeroizing::new(envelope.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&envelope.nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(&envelope.tag),
        )
        .map_err(|_| StegoError::InvalidPasswordOrCorruptPayload)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let env = seal(b"Hello, steganography!", "secret123").unwrap();
        assert_eq!(env.ciphertext.len(), 21);
        let pt = open(&env, "secret123").unwrap();
        assert_eq!(&pt[..], b"Hello, steganography!");
    }

    #[test]
    fn wrong_password_fails() {
        let env = seal(b"secret message", "correct").unwrap();
        assert_eq!(open(&env, "wrong"), Err(StegoError::InvalidPasswordOrCorruptPayload));
    }

    #[test]
    fn tampered_tag_fails() {
        let mut env = seal(b"secret message", "pw").unwrap();
        env.tag[3] ^= 0x01;
        assert_eq!(open(&env, "pw"), Err(StegoError::InvalidPasswordOrCorruptPayload));
    }

    #[test]
    fn fixed_inputs_are_deterministic() {
        let a = seal_with(b"abc", "pw", [1; SALT_LEN], [2; NONCE_LEN]).unwrap();
        let b = seal_with(b"abc", "pw", [1; SALT_LEN], [2; NONCE_LEN]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fresh_salt_and_nonce_per_seal() {
        let a = seal(b"same message", "pass").unwrap();
        let b = seal(b"same message", "pass").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn key_depends_on_salt() {
        assert_ne!(derive_key("pass", &[0u8; 16]), derive_key("pass", &[1u8; 16]));
    }
}
