// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Byte-level scorers for arbitrary files.
//!
//! The histogram and entropy helpers are shared with the image scorers,
//! which apply them to interleaved RGB samples.

/// Known file signatures. A match means the header is consistent.
pub const KNOWN_SIGNATURES: [&[u8]; 4] = [b"%PDF", b"\x89PNG", b"\xFF\xD8\xFF", b"PK\x03\x04"];

/// 256-bin value histogram.
pub fn byte_histogram(bytes: &[u8]) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &b in bytes {
        hist[b as usize] += 1;
    }
    hist
}

/// Shannon entropy in bits of a histogram. Empty histograms have entropy 0.
pub fn shannon_entropy(hist: &[u64; 256]) -> f64 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    hist.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Scale a ratio in `[0, 1]` to a truncated `0..=25` score.
pub(crate) fn scaled(ratio: f64) -> u8 {
    if !ratio.is_finite() {
        return 0;
    }
    (ratio.clamp(0.0, 1.0) * 25.0) as u8
}

/// Entropy of `bytes`, normalized by `ceiling` bits.
pub fn entropy_score(bytes: &[u8], ceiling: f64) -> u8 {
    if bytes.is_empty() {
        return 0;
    }
    scaled(shannon_entropy(&byte_histogram(bytes)) / ceiling)
}

/// Balance of least significant bits. A perfect 50/50 split scores 25.
pub fn bit_distribution_score(bytes: &[u8]) -> u8 {
    if bytes.is_empty() {
        return 0;
    }
    let ones = bytes.iter().filter(|&&b| b & 1 == 1).count() as f64;
    let total = bytes.len() as f64;
    let zeros = total - ones;
    scaled(1.0 - (zeros - ones).abs() / total)
}

/// Size relative to `reference` bytes.
pub fn file_size_score(len: u64, reference: u64) -> u8 {
    if reference == 0 {
        return 0;
    }
    scaled(len as f64 / reference as f64)
}

/// 0 for a recognized signature in the first 8 bytes, `penalty` otherwise.
pub fn header_score(bytes: &[u8], penalty: u8) -> u8 {
    let header = &bytes[..bytes.len().min(8)];
    if KNOWN_SIGNATURES.iter().any(|sig| header.starts_with(sig)) {
        0
    } else {
        penalty.min(25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_extremes() {
        assert_eq!(shannon_entropy(&byte_histogram(&[7; 100])), 0.0);
        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&byte_histogram(&all)) - 8.0).abs() < 1e-9);
        assert_eq!(entropy_score(&[], 8.0), 0);
        assert_eq!(entropy_score(&[1, 2], 8.0), 3); // 1 bit of 8
    }

    #[test]
    fn bit_distribution() {
        assert_eq!(bit_distribution_score(&[0, 1, 2, 3]), 25);
        assert_eq!(bit_distribution_score(&[0, 2, 4, 6]), 0);
        assert_eq!(bit_distribution_score(&[0, 2, 4, 1]), 12);
        assert_eq!(bit_distribution_score(&[]), 0);
    }

    #[test]
    fn size_is_capped() {
        let mib = 1024 * 1024;
        assert_eq!(file_size_score(0, 5 * mib), 0);
        assert_eq!(file_size_score(5 * mib / 5, 5 * mib), 5);
        assert_eq!(file_size_score(50 * mib, 5 * mib), 25);
    }

    #[test]
    fn headers() {
        assert_eq!(header_score(b"%PDF-1.7\n", 15), 0);
        assert_eq!(header_score(b"\x89PNG\r\n\x1a\n", 15), 0);
        assert_eq!(header_score(b"\xFF\xD8\xFF\xE0", 15), 0);
        assert_eq!(header_score(b"PK\x03\x04rest", 15), 0);
        assert_eq!(header_score(b"GIF89a", 15), 15);
        assert_eq!(header_score(b"", 15), 15);
    }
}
