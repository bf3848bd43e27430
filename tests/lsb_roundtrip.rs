// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Plain LSB embed/extract through the public boundary.

use deeptrace_core::stego::lsb;
use deeptrace_core::{embed, extract, lsb_capacity_bytes, max_secret_bytes, Algorithm, Carrier, StegoError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn noise_image(w: usize, h: usize, seed: u64) -> Carrier {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut data = vec![0u8; w * h * 3];
    rng.fill_bytes(&mut data);
    Carrier::new(w, h, data).unwrap()
}

fn flat_even(w: usize, h: usize) -> Carrier {
    Carrier::from_fn(w, h, |_, _| [100, 150, 200]).unwrap()
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn hi_in_257x257_noise() {
    let cover = noise_image(257, 257, 1);
    let stego = embed(&cover, Algorithm::Lsb, "hi", "").unwrap();
    assert_eq!(extract(&stego, Algorithm::Lsb, "").unwrap(), "hi");
}

#[test]
fn unicode_roundtrip() {
    let cover = noise_image(64, 64, 2);
    let text = "Grüße aus Köln ✓ 東京";
    let stego = embed(&cover, Algorithm::Lsb, text, "").unwrap();
    assert_eq!(extract(&stego, Algorithm::Lsb, "").unwrap(), text);
}

#[test]
fn survives_png_reencode() {
    let cover = noise_image(50, 30, 3);
    let stego = embed(&cover, Algorithm::Lsb, "lossless only", "").unwrap();
    let png = stego.encode_png().unwrap();
    let decoded = Carrier::decode(&png).unwrap();
    assert_eq!(decoded, stego);
    assert_eq!(extract(&decoded, Algorithm::Lsb, "").unwrap(), "lossless only");
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[test]
fn capacity_boundary_4x4() {
    // 4*4*3 / 8 = 6 bytes: 4 text bytes + 2 terminator bytes.
    let cover = flat_even(4, 4);
    assert_eq!(lsb_capacity_bytes(4, 4), 6);
    assert_eq!(max_secret_bytes(&cover, Algorithm::Lsb), 4);

    let stego = embed(&cover, Algorithm::Lsb, "abcd", "").unwrap();
    assert_eq!(extract(&stego, Algorithm::Lsb, "").unwrap(), "abcd");

    assert_eq!(
        embed(&cover, Algorithm::Lsb, "abcde", ""),
        Err(StegoError::CapacityExceeded { needed: 7, available: 6 })
    );
}

#[test]
fn capacity_rounds_down_partial_bytes() {
    // 3x3 RGB = 27 samples = 3 whole bytes.
    assert_eq!(lsb_capacity_bytes(3, 3), 3);
    let cover = flat_even(3, 3);
    assert!(embed(&cover, Algorithm::Lsb, "a", "").is_ok());
    assert!(matches!(
        embed(&cover, Algorithm::Lsb, "ab", ""),
        Err(StegoError::CapacityExceeded { needed: 4, available: 3 })
    ));
}

// ---------------------------------------------------------------------------
// Determinism and locality
// ---------------------------------------------------------------------------

#[test]
fn embedding_is_deterministic() {
    let cover = noise_image(40, 40, 4);
    let a = embed(&cover, Algorithm::Lsb, "same input", "").unwrap();
    let b = embed(&cover, Algorithm::Lsb, "same input", "").unwrap();
    assert_eq!(a, b);
}

#[test]
fn only_payload_lsbs_change() {
    let cover = noise_image(40, 40, 5);
    let text = "locality";
    let stego = embed(&cover, Algorithm::Lsb, text, "").unwrap();
    let payload_bits = (text.len() + 2) * 8;

    for (i, (&a, &b)) in cover.as_bytes().iter().zip(stego.as_bytes()).enumerate() {
        assert_eq!(a & !1, b & !1, "upper bits changed at sample {i}");
        if i >= payload_bits {
            assert_eq!(a, b, "sample {i} beyond the payload changed");
        }
    }
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn flat_even_image_has_no_message() {
    assert_eq!(extract(&flat_even(32, 32), Algorithm::Lsb, ""), Err(StegoError::NoHiddenMessage));
}

#[test]
fn raw_stream_ignores_terminator() {
    let cover = flat_even(16, 16);
    let stego = lsb::embed(&cover, "ab").unwrap();
    let raw = lsb::raw_bytes(&stego, 6);
    assert_eq!(raw, vec![b'a', b'b', 0xFF, 0xFE, 0, 0]);
}

#[test]
fn blank_secret_is_rejected() {
    assert_eq!(embed(&flat_even(8, 8), Algorithm::Lsb, "   ", ""), Err(StegoError::EmptySecret));
}
