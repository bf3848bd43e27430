// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed block/coefficient ordering.
//!
//! A secret key is hashed with SHA-256 and reduced modulo 2^32 to a seed.
//! The seed initialises a ChaCha20 PRNG that drives a Fisher-Yates shuffle
//! of `[0, n)`. Both encoder and decoder rebuild the same ordering from the
//! key and the carrier dimensions alone.
//!
//! # Generator ownership
//!
//! Every call constructs its own generator and moves it into the shuffle.
//! There is no process-wide RNG, so concurrent embeds with different keys
//! cannot interleave state.
//!
//! # Cross-platform portability
//!
//! The shuffle draws `u32` ranges (not `usize`) so the PRNG consumes the
//! same entropy per step on 32-bit and 64-bit targets.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Derive the 32-bit permutation seed from a key: `SHA-256(key) mod 2^32`.
///
/// Reducing the big-endian digest modulo 2^32 keeps its last four bytes.
pub fn derive_seed(key: &str) -> u32 {
    let digest = Sha256::digest(key.as_bytes());
    u32::from_be_bytes([digest[28], digest[29], digest[30], digest[31]])
}

/// Fisher-Yates shuffle consuming an owned generator.
fn shuffle_portable(indices: &mut [usize], mut rng: ChaCha20Rng) {
    let n = indices.len();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        indices.swap(i, j);
    }
}

/// Deterministic permutation of `[0, n)` for the given seed.
pub fn permutation(seed: u32, n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    shuffle_portable(&mut indices, ChaCha20Rng::seed_from_u64(u64::from(seed)));
    indices
}

/// Permutation of `[0, n)` keyed directly by a secret string.
pub fn keyed_permutation(key: &str, n: usize) -> Vec<usize> {
    permutation(derive_seed(key), n)
}
