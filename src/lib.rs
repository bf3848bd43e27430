// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # deeptrace-core
//!
//! Image steganography, keyed watermarking and blind steganalysis over
//! lossless RGB carriers. Provides four embedding schemes:
//!
//! - **LSB**: text in the least significant bits of every color sample.
//! - **Keyed LSB**: PBKDF2 + AES-256-GCM sealed envelope, base64-armored,
//!   embedded as LSB text. Wrong passwords and tampering fail identically.
//! - **DCT**: keyed coefficient-pair ordering in 8x8 luma blocks.
//! - **DWT**: keyed quantization index modulation on Haar HL coefficients.
//!
//! The `analysis` module scores images (or arbitrary files) for signs of
//! hidden data and tries to read back plaintext LSB payloads.
//!
//! Every operation is a pure function of its inputs. Keyed permutations use
//! a ChaCha20 generator created fresh per call, so concurrent calls with
//! different keys never interfere.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use deeptrace_core::{Algorithm, Carrier, embed, extract};
//!
//! let cover = Carrier::decode(&std::fs::read("cover.png").unwrap()).unwrap();
//! let stego = embed(&cover, Algorithm::Dwt, "owner: ACME", "wm-key").unwrap();
//! std::fs::write("stego.png", stego.encode_png().unwrap()).unwrap();
//! assert_eq!(extract(&stego, Algorithm::Dwt, "wm-key").unwrap(), "owner: ACME");
//! ```

pub mod analysis;
pub mod carrier;
pub mod stego;
pub mod watermark;

pub use analysis::{
    aggregate_scores, analyze_file, analyze_image, analyze_image_bytes, AnalysisReport, AnalysisScore, Detector,
    DetectorConfig, RiskLevel, ScoreDetails,
};
pub use carrier::Carrier;
pub use stego::capacity::{dct_capacity_bits, dwt_capacity_bits, dwt_payload_bits, lsb_capacity_bytes};
pub use stego::{capacity_bits, embed, extract, max_secret_bytes, Algorithm, Codec, StegoError};
