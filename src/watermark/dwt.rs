// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Haar-wavelet watermarking.
//!
//! One level of the averaging Haar transform splits the luma plane into
//! LL/LH/HL/HH subbands of half size. One bit is stored per HL coefficient
//! by quantization index modulation:
//!
//! ```text
//! q = round(hl / STEP)
//! bit 0 -> q even, bit 1 -> q odd   (q += 1 on mismatch)
//! hl' = q * STEP
//! ```
//!
//! The plane is edge-padded to even dimensions for the decomposition, but
//! only the `floor(h/2) * floor(w/2)` coefficients backed by real pixels
//! are eligible, and a payload may use at most [`DWT_MAX_PAYLOAD_BITS`] of
//! them. Coefficients are visited in keyed pseudo-random order.
//!
//! Clipping to [0, 255] can shift a coefficient into the wrong parity on
//! saturated carriers. Embedding reads every payload coefficient back from
//! the output and requantizes misread ones to a farther index of the right
//! parity, alternating direction, for up to `REFINE_PASSES` passes.

use tracing::{debug, warn};

use crate::carrier::Carrier;
use crate::stego::bits::{self, Utf8Policy, NUL_TERMINATOR};
use crate::stego::capacity::{dwt_capacity_bits, dwt_payload_bits, DWT_MAX_PAYLOAD_BITS};
use crate::stego::error::StegoError;
use crate::stego::permute;
use crate::watermark::luma::LumaPlane;

/// QIM quantization step.
pub const STEP: f64 = 10.0;

/// Read-back passes after the first embed pass.
const REFINE_PASSES: usize = 4;

/// One-level Haar decomposition of an even-sized plane.
#[derive(Debug, Clone)]
pub struct HaarSubbands {
    half_width: usize,
    half_height: usize,
    pub ll: Vec<f64>,
    pub lh: Vec<f64>,
    pub hl: Vec<f64>,
    pub hh: Vec<f64>,
}

impl HaarSubbands {
    /// Decompose a row-major plane whose dimensions are both even.
    pub fn decompose(plane: &[f64], width: usize, height: usize) -> Self {
        debug_assert!(width % 2 == 0 && height % 2 == 0);
        let (hw, hh_) = (width / 2, height / 2);
        let n = hw * hh_;
        let mut bands = Self {
            half_width: hw,
            half_height: hh_,
            ll: Vec::with_capacity(n),
            lh: Vec::with_capacity(n),
            hl: Vec::with_capacity(n),
            hh: Vec::with_capacity(n),
        };
        for r in 0..hh_ {
            let top = 2 * r * width;
            let bottom = top + width;
            for c in 0..hw {
                let (x00, x01) = (plane[top + 2 * c], plane[top + 2 * c + 1]);
                let (x10, x11) = (plane[bottom + 2 * c], plane[bottom + 2 * c + 1]);
                // Horizontal pass.
                let (l0, h0) = ((x00 + x01) / 2.0, (x00 - x01) / 2.0);
                let (l1, h1) = ((x10 + x11) / 2.0, (x10 - x11) / 2.0);
                // Vertical pass.
                bands.ll.push((l0 + l1) / 2.0);
                bands.lh.push((l0 - l1) / 2.0);
                bands.hl.push((h0 + h1) / 2.0);
                bands.hh.push((h0 - h1) / 2.0);
            }
        }
        bands
    }

    /// Rebuild the full-size plane.
    pub fn reconstruct(&self) -> Vec<f64> {
        let width = self.half_width * 2;
        let mut plane = vec![0.0f64; width * self.half_height * 2];
        for r in 0..self.half_height {
            let top = 2 * r * width;
            let bottom = top + width;
            for c in 0..self.half_width {
                let i = r * self.half_width + c;
                let (l0, l1) = (self.ll[i] + self.lh[i], self.ll[i] - self.lh[i]);
                let (h0, h1) = (self.hl[i] + self.hh[i], self.hl[i] - self.hh[i]);
                plane[top + 2 * c] = l0 + h0;
                plane[top + 2 * c + 1] = l0 - h0;
                plane[bottom + 2 * c] = l1 + h1;
                plane[bottom + 2 * c + 1] = l1 - h1;
            }
        }
        plane
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    pub fn half_height(&self) -> usize {
        self.half_height
    }
}

/// Coefficient grid eligible for payload, from the original dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientGrid {
    pub usable_width: usize,
    pub usable_height: usize,
}

impl CoefficientGrid {
    pub fn for_dimensions(width: usize, height: usize) -> Self {
        Self { usable_width: width / 2, usable_height: height / 2 }
    }

    pub fn usable(&self) -> usize {
        self.usable_width * self.usable_height
    }

    /// Position `(row, col)` in the HL subband of usable coefficient `idx`.
    pub fn position(&self, idx: usize) -> (usize, usize) {
        (idx / self.usable_width, idx % self.usable_width)
    }
}

fn quantize(value: f64) -> i64 {
    (value / STEP).round() as i64
}

/// Quantize `value` so the index parity equals `bit`.
pub fn qim_embed(value: f64, bit: u8) -> f64 {
    let mut q = quantize(value);
    if q.rem_euclid(2) as u8 != (bit & 1) {
        q += 1;
    }
    q as f64 * STEP
}

/// Requantize a misread `value` to an index of parity `bit`, `offset`
/// steps from its current index. `offset` must be odd.
fn qim_requantize(value: f64, bit: u8, offset: i64) -> f64 {
    let mut q = quantize(value);
    if q.rem_euclid(2) as u8 != (bit & 1) {
        q += offset;
    }
    q as f64 * STEP
}

/// Index offset tried on refinement `pass`: -1, +3, -5, +7, ...
fn refine_offset(pass: usize) -> i64 {
    let magnitude = 2 * pass as i64 - 1;
    if pass % 2 == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// Parity of the quantization index.
pub fn qim_extract(value: f64) -> u8 {
    quantize(value).rem_euclid(2) as u8
}

fn subbands_of(carrier: &Carrier) -> (LumaPlane, HaarSubbands, usize) {
    let plane = LumaPlane::from_carrier(carrier);
    let (padded, pw, ph) = plane.padded(2);
    let bands = HaarSubbands::decompose(&padded, pw, ph);
    (plane, bands, pw)
}

/// Write `targets` (bit, HL index) into a copy of `carrier`.
///
/// Pass 0 quantizes every target. Later passes only requantize targets
/// that currently misread.
fn write_pass(carrier: &Carrier, targets: &[(u8, usize)], pass: usize) -> Result<Carrier, StegoError> {
    let (mut plane, mut bands, padded_width) = subbands_of(carrier);
    for &(bit, i) in targets {
        let cell = &mut bands.hl[i];
        if pass == 0 {
            *cell = qim_embed(*cell, bit);
        } else if qim_extract(*cell) != bit {
            *cell = qim_requantize(*cell, bit, refine_offset(pass));
        }
    }
    let rebuilt = bands.reconstruct();
    plane.store_cropped(&rebuilt, padded_width);
    plane.to_carrier()
}

/// Number of `targets` that `carrier` does not read back as written.
fn misread_bits(carrier: &Carrier, targets: &[(u8, usize)]) -> usize {
    let (_, bands, _) = subbands_of(carrier);
    targets.iter().filter(|&&(bit, i)| qim_extract(bands.hl[i]) != bit).count()
}

/// Embed `text` (plus a zero-byte terminator) under `key`.
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] (in bits) if the payload needs more
///   than `min(floor(h/2) * floor(w/2), DWT_MAX_PAYLOAD_BITS)` coefficients.
/// - [`StegoError::WatermarkClipped`] if clipping keeps some coefficients
///   from reading back after every refinement pass.
pub fn embed(carrier: &Carrier, key: &str, text: &str) -> Result<Carrier, StegoError> {
    let grid = CoefficientGrid::for_dimensions(carrier.width(), carrier.height());
    let usable = grid.usable();
    debug_assert_eq!(usable, dwt_capacity_bits(carrier.width(), carrier.height()));
    let available = dwt_payload_bits(carrier.width(), carrier.height());

    let mut payload = bits::to_bits(text);
    payload.extend_from_slice(&bits::bytes_to_bits(&[NUL_TERMINATOR]));
    if payload.len() > available {
        return Err(StegoError::CapacityExceeded { needed: payload.len(), available });
    }

    let order = permute::keyed_permutation(key, usable);
    // HL row stride of the even-padded plane.
    let stride = carrier.width().div_ceil(2);
    let targets: Vec<(u8, usize)> = payload
        .iter()
        .zip(&order)
        .map(|(&bit, &idx)| {
            let (r, c) = grid.position(idx);
            (bit, r * stride + c)
        })
        .collect();

    debug!(
        width = carrier.width(),
        height = carrier.height(),
        usable_coefficients = usable,
        payload_bits = payload.len(),
        "dwt embed"
    );

    let mut stego = write_pass(carrier, &targets, 0)?;
    let mut pass = 0;
    loop {
        let misread = misread_bits(&stego, &targets);
        if misread == 0 {
            return Ok(stego);
        }
        if pass == REFINE_PASSES {
            warn!(misread_bits = misread, "dwt watermark clipped");
            return Err(StegoError::WatermarkClipped { unreadable_bits: misread });
        }
        pass += 1;
        debug!(pass, misread_bits = misread, "dwt refine");
        stego = write_pass(&stego, &targets, pass)?;
    }
}

/// Extract text embedded by [`embed`].
///
/// Scans at most [`DWT_MAX_PAYLOAD_BITS`] coefficients. A wrong key yields
/// unrelated text rather than an error.
pub fn extract(carrier: &Carrier, key: &str) -> Result<String, StegoError> {
    let grid = CoefficientGrid::for_dimensions(carrier.width(), carrier.height());
    let usable = grid.usable();
    let order = permute::keyed_permutation(key, usable);
    let (_, bands, _) = subbands_of(carrier);
    let stride = bands.half_width();

    let mut pending: Vec<u8> = Vec::with_capacity(8);
    let mut bytes: Vec<u8> = Vec::new();
    for &idx in order.iter().take(DWT_MAX_PAYLOAD_BITS) {
        let (r, c) = grid.position(idx);
        pending.push(qim_extract(bands.hl[r * stride + c]));
        if pending.len() == 8 {
            let byte = bits::pack_byte(&pending);
            pending.clear();
            if byte == NUL_TERMINATOR {
                break;
            }
            bytes.push(byte);
        }
    }

    debug!(usable_coefficients = usable, payload_bytes = bytes.len(), "dwt extract");
    bits::decode_text(bytes, Utf8Policy::Lenient)
}
