// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed transform-domain watermarking on the luma channel.
//!
//! - **DCT** ([`dct`]): one bit per 8x8 block, stored as the ordering of a
//!   mid-frequency coefficient pair.
//! - **DWT** ([`dwt`]): one bit per HL coefficient of a one-level Haar
//!   decomposition, stored by quantization parity.
//!
//! Both codecs terminate the payload with a single zero byte and derive
//! the usable block/coefficient count from the carrier dimensions alone,
//! so embed and extract always agree without side metadata.

pub mod dct;
pub mod dwt;
pub mod luma;

pub use luma::LumaPlane;
