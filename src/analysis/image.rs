// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Statistical scorers over decoded RGB carriers.
//!
//! Every scorer returns a truncated integer in `0..=25` and never fails:
//! degenerate inputs (empty, zero variance) resolve to a defined score.

use crate::analysis::file::{self, byte_histogram, scaled};
use crate::carrier::Carrier;

/// LSB balance over every RGB sample. Embedded random-looking payloads
/// push the split towards 50/50, which scores high.
pub fn lsb_score(carrier: &Carrier) -> u8 {
    file::bit_distribution_score(carrier.as_bytes())
}

/// Shannon entropy of the sample histogram, normalized by `ceiling` bits.
pub fn entropy_score(carrier: &Carrier, ceiling: f64) -> u8 {
    file::entropy_score(carrier.as_bytes(), ceiling)
}

/// Mean absolute first difference of the 256-bin sample histogram,
/// normalized by `divisor`.
pub fn histogram_score(carrier: &Carrier, divisor: f64) -> u8 {
    let hist = byte_histogram(carrier.as_bytes());
    let diff_sum: u64 = hist.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
    let mean = diff_sum as f64 / (hist.len() - 1) as f64;
    scaled(mean / divisor)
}

/// One minus the Pearson correlation between the gray image and itself
/// shifted one column left (wrapping), normalized by `divisor`.
/// Zero-variance images have an undefined correlation, taken as 0.
pub fn correlation_score(carrier: &Carrier, divisor: f64) -> u8 {
    let corr = horizontal_correlation(carrier).unwrap_or(0.0);
    scaled((1.0 - corr) / divisor)
}

/// Pearson correlation of horizontally adjacent gray values, or `None`
/// when either series has zero variance.
pub fn horizontal_correlation(carrier: &Carrier) -> Option<f64> {
    let (w, h) = (carrier.width(), carrier.height());
    let gray: Vec<f64> = carrier
        .as_bytes()
        .chunks_exact(3)
        .map(|px| (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0)
        .collect();
    let n = gray.len() as f64;
    if gray.is_empty() {
        return None;
    }

    // The shifted series is a permutation of the original, so both share
    // one mean.
    let mean = gray.iter().sum::<f64>() / n;
    let (mut cov, mut var) = (0.0f64, 0.0f64);
    for row in 0..h {
        let line = &gray[row * w..(row + 1) * w];
        for col in 0..w {
            let a = line[col] - mean;
            let b = line[(col + 1) % w] - mean;
            cov += a * b;
            var += a * a;
        }
    }
    if var <= f64::EPSILON * n {
        return None;
    }
    let corr = cov / var;
    corr.is_finite().then_some(corr.clamp(-1.0, 1.0))
}

/// Chi-square statistic over pairs of adjacent gray-level bins
/// `(2i, 2i+1)`, normalized by `divisor`.
pub fn chi_square_score(carrier: &Carrier, divisor: f64) -> u8 {
    scaled(chi_square_statistic(&carrier.gray()) / divisor)
}

/// Raw pairs-of-values chi-square statistic of a gray channel.
pub fn chi_square_statistic(gray: &[u8]) -> f64 {
    let hist = byte_histogram(gray);
    hist.chunks_exact(2)
        .filter_map(|pair| {
            let (o1, o2) = (pair[0] as f64, pair[1] as f64);
            let expected = (o1 + o2) / 2.0;
            (expected > 0.0).then(|| ((o1 - expected).powi(2) + (o2 - expected).powi(2)) / expected)
        })
        .sum()
}
