// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Blind LSB recovery and plausibility filtering.

use tracing::{debug, warn};

use crate::analysis::config::DetectorConfig;
use crate::carrier::Carrier;
use crate::stego::bits::{self, Utf8Policy};
use crate::stego::lsb;

/// Characters counted as printable: ASCII graphic plus ASCII whitespace
/// including vertical tab and form feed.
pub fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Decode `bytes` leniently and keep the text only if it looks like
/// deliberate content: at least `min_content_len` characters, of which at
/// least `printable_ratio` are printable. The accepted text is trimmed.
pub fn validate_content(bytes: &[u8], config: &DetectorConfig) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let decoded = bits::decode_text(bytes.to_vec(), Utf8Policy::Lenient).ok()?;

    let total = decoded.chars().count();
    if total < config.min_content_len {
        return None;
    }
    let printable = decoded.chars().filter(|&c| is_printable(c)).count();
    if (printable as f64) / (total as f64) < config.printable_ratio {
        return None;
    }
    Some(decoded.trim().to_string())
}

/// Read the raw LSB stream (no terminator search) and validate it.
pub fn recover_lsb_text(carrier: &Carrier, config: &DetectorConfig) -> Option<String> {
    let raw = lsb::raw_bytes(carrier, config.recovery_max_bytes);
    debug!(raw_bytes = raw.len(), "blind lsb recovery");
    let found = validate_content(&raw, config);
    if found.is_none() {
        warn!(raw_bytes = raw.len(), "recovered lsb stream failed plausibility check");
    }
    found
}
