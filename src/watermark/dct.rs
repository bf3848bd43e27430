// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block-DCT watermarking.
//!
//! The luma plane is cut into 8x8 blocks. One bit is stored per block in
//! the ordering of two mid-frequency coefficients:
//!
//! - bit 1: `F[4][3] > F[3][4] + DELTA`
//! - bit 0: `F[3][4] > F[4][3] + DELTA`
//!
//! When a block does not already satisfy its bit, both coefficients are
//! moved symmetrically around their midpoint to a gap of `DELTA + GAP_SLACK`,
//! so the strict inequality holds. Extraction only compares the two values.
//!
//! Luma is clipped to [0, 255] when RGB is rebuilt, which can undo an edit
//! in saturated blocks. After the first pass every payload block is read
//! back from the output; misread blocks are pushed again with a wider
//! margin for up to `REFINE_PASSES` passes. If any bit is still misread the
//! embed fails with [`StegoError::WatermarkClipped`].
//!
//! Blocks are visited in a keyed pseudo-random order over the *usable*
//! blocks, i.e. those lying entirely inside the original image. Edge
//! padding is used for reconstruction only and never carries payload.

use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::carrier::Carrier;
use crate::stego::bits::{self, Utf8Policy, NUL_TERMINATOR};
use crate::stego::capacity::{dct_capacity_bits, DCT_BLOCK};
use crate::stego::error::StegoError;
use crate::stego::permute;
use crate::watermark::luma::LumaPlane;

/// First coefficient of the pair, `(row, col)` in natural order.
pub const COEFF_A: (usize, usize) = (4, 3);
/// Second coefficient of the pair.
pub const COEFF_B: (usize, usize) = (3, 4);
/// Minimum coefficient gap enforced at embed time.
pub const DELTA: f64 = 20.0;

/// Added on top of the margin so an edited pair clears it strictly.
const GAP_SLACK: f64 = 1.0;

/// Read-back passes after the first embed pass.
const REFINE_PASSES: usize = 4;

/// Level shift applied before the forward transform.
const LEVEL_SHIFT: f64 = 128.0;

/// Pre-computed 8x8 cosine table.
/// `COSINE[u][x] = cos((2*x + 1) * u * PI / 16)`
static COSINE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();

/// Orthonormal scale factors: C(0) = 1/sqrt(8), C(u>0) = 1/2.
static NORM: OnceLock<[f64; 8]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; 8]; 8] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                *v = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

fn norm_table() -> &'static [f64; 8] {
    NORM.get_or_init(|| {
        let mut n = [0.5f64; 8];
        n[0] = 1.0 / (8.0f64).sqrt();
        n
    })
}

/// Orthonormal 2D DCT-II of one 8x8 block (row-major in, row-major out).
pub fn forward_dct(block: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();
    let c = norm_table();

    // Rows.
    let mut temp = [0.0f64; 64];
    for row in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for x in 0..8 {
                sum += block[row * 8 + x] * cos[u][x];
            }
            temp[row * 8 + u] = c[u] * sum;
        }
    }

    // Columns.
    let mut coeffs = [0.0f64; 64];
    for col in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                sum += temp[y * 8 + col] * cos[v][y];
            }
            coeffs[v * 8 + col] = c[v] * sum;
        }
    }
    coeffs
}

/// Inverse of [`forward_dct`].
pub fn inverse_dct(coeffs: &[f64; 64]) -> [f64; 64] {
    let cos = cosine_table();
    let c = norm_table();

    // Columns.
    let mut temp = [0.0f64; 64];
    for col in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0;
            for v in 0..8 {
                sum += c[v] * coeffs[v * 8 + col] * cos[v][y];
            }
            temp[y * 8 + col] = sum;
        }
    }

    // Rows.
    let mut out = [0.0f64; 64];
    for row in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += c[u] * temp[row * 8 + u] * cos[u][x];
            }
            out[row * 8 + x] = sum;
        }
    }
    out
}

/// Block grid geometry derived from the original (unpadded) dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    /// Whole blocks per row inside the original width.
    pub blocks_wide: usize,
    /// Whole blocks per column inside the original height.
    pub blocks_tall: usize,
}

impl BlockGrid {
    pub fn for_dimensions(width: usize, height: usize) -> Self {
        Self { blocks_wide: width / DCT_BLOCK, blocks_tall: height / DCT_BLOCK }
    }

    pub fn usable_blocks(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Top-left pixel `(row, col)` of usable block `idx`.
    pub fn origin(&self, idx: usize) -> (usize, usize) {
        ((idx / self.blocks_wide) * DCT_BLOCK, (idx % self.blocks_wide) * DCT_BLOCK)
    }
}

fn read_block(plane: &[f64], stride: usize, origin: (usize, usize)) -> [f64; 64] {
    let mut block = [0.0f64; 64];
    for r in 0..8 {
        let base = (origin.0 + r) * stride + origin.1;
        for c in 0..8 {
            block[r * 8 + c] = plane[base + c] - LEVEL_SHIFT;
        }
    }
    block
}

fn write_block(plane: &mut [f64], stride: usize, origin: (usize, usize), block: &[f64; 64]) {
    for r in 0..8 {
        let base = (origin.0 + r) * stride + origin.1;
        for c in 0..8 {
            plane[base + c] = block[r * 8 + c] + LEVEL_SHIFT;
        }
    }
}

/// Force the coefficient pair to encode `bit` with a gap above `margin`.
/// Returns `true` if changed.
fn encode_pair(coeffs: &mut [f64; 64], bit: u8, margin: f64) -> bool {
    let a = COEFF_A.0 * 8 + COEFF_A.1;
    let b = COEFF_B.0 * 8 + COEFF_B.1;
    let (v1, v2) = (coeffs[a], coeffs[b]);
    let mid = (v1 + v2) / 2.0;
    let half = (margin + GAP_SLACK) / 2.0;

    if bit == 1 && v1 <= v2 + margin {
        coeffs[a] = mid + half;
        coeffs[b] = mid - half;
        true
    } else if bit == 0 && v2 <= v1 + margin {
        coeffs[b] = mid + half;
        coeffs[a] = mid - half;
        true
    } else {
        false
    }
}

fn decode_pair(coeffs: &[f64; 64]) -> u8 {
    let v1 = coeffs[COEFF_A.0 * 8 + COEFF_A.1];
    let v2 = coeffs[COEFF_B.0 * 8 + COEFF_B.1];
    u8::from(v1 > v2)
}

/// Write `targets` into a copy of `carrier`.
///
/// The first pass (`pass == 0`) edits every block that does not yet clear
/// [`DELTA`]. Later passes only touch blocks that currently misread, with
/// a margin growing by `DELTA` per pass. Returns the new carrier and the
/// number of blocks written.
fn write_pass(
    carrier: &Carrier,
    targets: &[(u8, (usize, usize))],
    pass: usize,
) -> Result<(Carrier, usize), StegoError> {
    let mut plane = LumaPlane::from_carrier(carrier);
    let (mut padded, stride, _) = plane.padded(DCT_BLOCK);
    let margin = DELTA * (pass + 1) as f64;

    let mut written = 0usize;
    for &(bit, origin) in targets {
        let mut coeffs = forward_dct(&read_block(&padded, stride, origin));
        if pass > 0 && decode_pair(&coeffs) == bit {
            continue;
        }
        if encode_pair(&mut coeffs, bit, margin) {
            written += 1;
            write_block(&mut padded, stride, origin, &inverse_dct(&coeffs));
        }
    }

    plane.store_cropped(&padded, stride);
    Ok((plane.to_carrier()?, written))
}

/// Number of `targets` that `carrier` does not read back as written.
fn misread_bits(carrier: &Carrier, targets: &[(u8, (usize, usize))]) -> usize {
    let plane = LumaPlane::from_carrier(carrier);
    let (padded, stride, _) = plane.padded(DCT_BLOCK);
    targets
        .iter()
        .filter(|&&(bit, origin)| decode_pair(&forward_dct(&read_block(&padded, stride, origin))) != bit)
        .count()
}

/// Embed `text` (plus a zero-byte terminator) under `key`.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] (in bits) if the payload needs more
///   blocks than the image has whole 8x8 blocks.
/// - [`StegoError::WatermarkClipped`] if clipping keeps some blocks from
///   reading back after every refinement pass.
pub fn embed(carrier: &Carrier, key: &str, text: &str) -> Result<Carrier, StegoError> {
    let grid = BlockGrid::for_dimensions(carrier.width(), carrier.height());
    let usable = grid.usable_blocks();
    debug_assert_eq!(usable, dct_capacity_bits(carrier.width(), carrier.height()));

    let mut payload = bits::to_bits(text);
    payload.extend_from_slice(&bits::bytes_to_bits(&[NUL_TERMINATOR]));
    if payload.len() > usable {
        return Err(StegoError::CapacityExceeded { needed: payload.len(), available: usable });
    }

    let order = permute::keyed_permutation(key, usable);
    let targets: Vec<(u8, (usize, usize))> =
        payload.iter().zip(&order).map(|(&bit, &idx)| (bit, grid.origin(idx))).collect();

    let (mut stego, changed) = write_pass(carrier, &targets, 0)?;
    debug!(
        width = carrier.width(),
        height = carrier.height(),
        usable_blocks = usable,
        payload_bits = payload.len(),
        changed_blocks = changed,
        "dct embed"
    );

    let mut pass = 0;
    loop {
        let misread = misread_bits(&stego, &targets);
        if misread == 0 {
            return Ok(stego);
        }
        if pass == REFINE_PASSES {
            warn!(misread_bits = misread, "dct watermark clipped");
            return Err(StegoError::WatermarkClipped { unreadable_bits: misread });
        }
        pass += 1;
        debug!(pass, misread_bits = misread, "dct refine");
        stego = write_pass(&stego, &targets, pass)?.0;
    }
}

/// Extract text embedded by [`embed`].
///
/// Never fails on a wrong key: the block order diverges and the result is
/// whatever the visited blocks happen to encode.
pub fn extract(carrier: &Carrier, key: &str) -> Result<String, StegoError> {
    let grid = BlockGrid::for_dimensions(carrier.width(), carrier.height());
    let usable = grid.usable_blocks();
    let order = permute::keyed_permutation(key, usable);

    let plane = LumaPlane::from_carrier(carrier);
    let (padded, stride, _) = plane.padded(DCT_BLOCK);

    let mut bits_out: Vec<u8> = Vec::new();
    let mut bytes: Vec<u8> = Vec::new();
    for &idx in &order {
        let coeffs = forward_dct(&read_block(&padded, stride, grid.origin(idx)));
        bits_out.push(decode_pair(&coeffs));
        if bits_out.len() == 8 {
            let byte = bits::pack_byte(&bits_out);
            bits_out.clear();
            if byte == NUL_TERMINATOR {
                break;
            }
            bytes.push(byte);
        }
    }

    debug!(usable_blocks = usable, payload_bytes = bytes.len(), "dct extract");
    bits::decode_text(bytes, Utf8Policy::Lenient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dct_inverse_roundtrip() {
        let mut block = [0.0f64; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = ((i * 37) % 255) as f64 - 128.0;
        }
        let back = inverse_dct(&forward_dct(&block));
        for i in 0..64 {
            assert!((back[i] - block[i]).abs() < 1e-9, "mismatch at {i}");
        }
    }

    #[test]
    fn flat_block_is_dc_only() {
        let block = [16.0f64; 64];
        let coeffs = forward_dct(&block);
        assert!((coeffs[0] - 128.0).abs() < 1e-9);
        for &c in &coeffs[1..] {
            assert!(c.abs() < 1e-9);
        }
    }

    #[test]
    fn pair_encoding_enforces_margin() {
        let mut coeffs = [0.0f64; 64];
        coeffs[4 * 8 + 3] = 5.0;
        coeffs[3 * 8 + 4] = 7.0;
        assert!(encode_pair(&mut coeffs, 1, DELTA));
        assert_eq!(decode_pair(&coeffs), 1);
        assert!(coeffs[35] > coeffs[28] + DELTA);
        // Midpoint preserved.
        assert!((coeffs[35] + coeffs[28] - 12.0).abs() < 1e-12);
        // The edited pair now clears the margin, so a second call is a no-op.
        assert!(!encode_pair(&mut coeffs, 1, DELTA));

        assert!(encode_pair(&mut coeffs, 0, DELTA));
        assert_eq!(decode_pair(&coeffs), 0);
        assert!(coeffs[28] > coeffs[35] + DELTA);
    }

    #[test]
    fn pair_at_exact_margin_is_widened() {
        let mut coeffs = [0.0f64; 64];
        coeffs[4 * 8 + 3] = DELTA;
        coeffs[3 * 8 + 4] = 0.0;
        assert!(encode_pair(&mut coeffs, 1, DELTA));
        assert!(coeffs[35] - coeffs[28] > DELTA);
    }

    #[test]
    fn satisfied_pair_is_left_alone() {
        let mut coeffs = [0.0f64; 64];
        coeffs[4 * 8 + 3] = 50.0;
        coeffs[3 * 8 + 4] = 0.0;
        assert!(!encode_pair(&mut coeffs, 1, DELTA));
        assert_eq!(coeffs[35], 50.0);
    }

    #[test]
    fn grid_ignores_partial_blocks() {
        let g = BlockGrid::for_dimensions(23, 17);
        assert_eq!(g.usable_blocks(), 2 * 2);
        assert_eq!(g.origin(3), (8, 8));
    }

    #[test]
    fn roundtrip_on_flat_gray() {
        let c = Carrier::from_fn(48, 48, |_, _| [120, 120, 120]).unwrap();
        let stego = embed(&c, "k", "wm!").unwrap();
        assert_eq!(extract(&stego, "k").unwrap(), "wm!");
    }

    #[test]
    fn capacity_exceeded_in_bits() {
        let c = Carrier::from_fn(16, 16, |_, _| [100, 100, 100]).unwrap();
        let err = embed(&c, "k", "x").unwrap_err();
        assert_eq!(err, StegoError::CapacityExceeded { needed: 16, available: 4 });
    }

    #[test]
    fn saturated_carrier_never_yields_unreadable_success() {
        let white = Carrier::from_fn(32, 32, |_, _| [255, 255, 255]).unwrap();
        match embed(&white, "k", "hi") {
            Ok(stego) => assert_eq!(extract(&stego, "k").unwrap(), "hi"),
            Err(e) => assert!(matches!(e, StegoError::WatermarkClipped { unreadable_bits } if unreadable_bits > 0)),
        }
    }
}
