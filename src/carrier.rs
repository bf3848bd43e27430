// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Owned RGB pixel buffer shared by every codec and the detector.
//!
//! Pixels are stored row-major, three bytes per pixel in R,G,B order, with
//! a stride of `3 * width`. Dimensions are fixed for the lifetime of the
//! value; codecs take a `&Carrier` and hand back a new one.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::stego::error::StegoError;

/// Bytes per pixel (R, G, B).
pub const CHANNELS: usize = 3;

/// A rectangular RGB image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Carrier {
    /// Wrap an interleaved RGB buffer.
    ///
    /// # Errors
    /// [`StegoError::InvalidCarrierFormat`] if either dimension is zero or
    /// `data.len() != width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, StegoError> {
        if width == 0 || height == 0 {
            return Err(StegoError::InvalidCarrierFormat(format!(
                "zero-sized carrier ({width}x{height})"
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|p| p.checked_mul(CHANNELS))
            .ok_or_else(|| StegoError::InvalidCarrierFormat("dimensions overflow".into()))?;
        if data.len() != expected {
            return Err(StegoError::InvalidCarrierFormat(format!(
                "buffer holds {} bytes, {width}x{height} RGB needs {expected}",
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Build a carrier by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; 3],
    ) -> Result<Self, StegoError> {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// Decode any image format the `image` crate understands and normalise
    /// it to 8-bit RGB (gray is expanded, alpha is dropped).
    pub fn decode(bytes: &[u8]) -> Result<Self, StegoError> {
        let img = image::load_from_memory(bytes)?;
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        Self::new(w as usize, h as usize, rgb.into_raw())
    }

    /// Encode as PNG. Any lossy re-encoding would destroy the payload.
    pub fn encode_png(&self) -> Result<Vec<u8>, StegoError> {
        let w = u32::try_from(self.width)
            .map_err(|_| StegoError::InvalidCarrierFormat("width exceeds u32".into()))?;
        let h = u32::try_from(self.height)
            .map_err(|_| StegoError::InvalidCarrierFormat("height exceeds u32".into()))?;
        let mut out = Cursor::new(Vec::new());
        PngEncoder::new(&mut out).write_image(&self.data, w, h, ColorType::Rgb8)?;
        Ok(out.into_inner())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width * CHANNELS
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Interleaved RGB samples, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = y * self.stride() + x * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Per-pixel channel mean, truncated to `u8`. Used by the grayscale
    /// statistics in the detector.
    pub fn gray(&self) -> Vec<u8> {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let err = Carrier::new(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, StegoError::InvalidCarrierFormat(_)));
        assert!(Carrier::new(0, 4, vec![]).is_err());
    }

    #[test]
    fn pixel_indexing_is_row_major() {
        let c = Carrier::from_fn(3, 2, |x, y| [x as u8, y as u8, 7]).unwrap();
        assert_eq!(c.stride(), 9);
        assert_eq!(c.pixel(2, 1), [2, 1, 7]);
        assert_eq!(&c.as_bytes()[9..12], &[0, 1, 7]);
    }

    #[test]
    fn png_roundtrip_is_lossless() {
        let c = Carrier::from_fn(17, 9, |x, y| [(x * 13) as u8, (y * 29) as u8, (x ^ y) as u8])
            .unwrap();
        let png = c.encode_png().unwrap();
        let back = Carrier::decode(&png).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = Carrier::decode(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), "InvalidCarrierFormat");
    }

    #[test]
    fn gray_is_channel_mean() {
        let c = Carrier::from_fn(1, 1, |_, _| [10, 20, 33]).unwrap();
        assert_eq!(c.gray(), vec![21]);
    }
}
