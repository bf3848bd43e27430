// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Luma/chroma split for the transform codecs.
//!
//! RGB is converted to full-range YCbCr (JFIF coefficients) in `f64`. Only
//! the Y plane is modified; Cb and Cr are kept at full precision so pixels
//! whose luma is untouched convert back to their exact original RGB.

use crate::carrier::{Carrier, CHANNELS};
use crate::stego::error::StegoError;

/// Y plane plus the chroma needed to rebuild RGB.
#[derive(Debug, Clone)]
pub struct LumaPlane {
    width: usize,
    height: usize,
    y: Vec<f64>,
    cb: Vec<f64>,
    cr: Vec<f64>,
}

impl LumaPlane {
    pub fn from_carrier(carrier: &Carrier) -> Self {
        let n = carrier.pixel_count();
        let mut y = Vec::with_capacity(n);
        let mut cb = Vec::with_capacity(n);
        let mut cr = Vec::with_capacity(n);
        for px in carrier.as_bytes().chunks_exact(CHANNELS) {
            let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
            y.push(0.299 * r + 0.587 * g + 0.114 * b);
            cb.push(128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b);
            cr.push(128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b);
        }
        Self { width: carrier.width(), height: carrier.height(), y, cb, cr }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major luma samples.
    pub fn luma(&self) -> &[f64] {
        &self.y
    }

    /// Copy of the luma plane, edge-replicated on the right and bottom up to
    /// the next multiple of `multiple`.
    ///
    /// Returns `(samples, padded_width, padded_height)`. The padding exists
    /// only so whole transform units can be formed; it is discarded by
    /// [`LumaPlane::store_cropped`].
    pub fn padded(&self, multiple: usize) -> (Vec<f64>, usize, usize) {
        let pw = self.width.div_ceil(multiple) * multiple;
        let ph = self.height.div_ceil(multiple) * multiple;
        let mut out = Vec::with_capacity(pw * ph);
        for row in 0..ph {
            let src_row = row.min(self.height - 1) * self.width;
            for col in 0..pw {
                out.push(self.y[src_row + col.min(self.width - 1)]);
            }
        }
        (out, pw, ph)
    }

    /// Write back the top-left `width x height` region of a padded plane.
    pub fn store_cropped(&mut self, padded: &[f64], padded_width: usize) {
        for row in 0..self.height {
            let src = &padded[row * padded_width..row * padded_width + self.width];
            self.y[row * self.width..(row + 1) * self.width].copy_from_slice(src);
        }
    }

    /// Clip luma to [0, 255], recombine with the stored chroma and round.
    pub fn to_carrier(&self) -> Result<Carrier, StegoError> {
        let mut data = Vec::with_capacity(self.y.len() * CHANNELS);
        for i in 0..self.y.len() {
            let y = self.y[i].clamp(0.0, 255.0);
            let cb = self.cb[i] - 128.0;
            let cr = self.cr[i] - 128.0;
            data.push(to_u8(y + 1.402 * cr));
            data.push(to_u8(y - 0.344_136 * cb - 0.714_136 * cr));
            data.push(to_u8(y + 1.772 * cb));
        }
        Carrier::new(self.width, self.height, data)
    }
}

fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
