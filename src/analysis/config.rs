// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Detector calibration.
//!
//! All thresholds are empirical. They are exposed here so deployments can
//! tune them from a JSON document without touching code. Missing fields
//! keep their defaults.

use serde::{Deserialize, Serialize};

use crate::analysis::report::RiskLevel;

/// Calibration constants for [`Detector`](crate::analysis::Detector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum share of printable characters for recovered text.
    pub printable_ratio: f64,
    /// Minimum character count for recovered text.
    pub min_content_len: usize,
    /// Byte cap for raw LSB recovery.
    pub recovery_max_bytes: usize,
    /// Divisor normalizing the chi-square statistic.
    pub chi_square_divisor: f64,
    /// Divisor normalizing the mean histogram first difference.
    pub histogram_divisor: f64,
    /// Divisor normalizing one minus the adjacent-pixel correlation.
    pub correlation_divisor: f64,
    /// Entropy (bits) that maps to a full score.
    pub entropy_ceiling: f64,
    /// File size (bytes) that maps to a full size score.
    pub file_size_reference: u64,
    /// Score for a file whose header matches no known signature.
    pub unknown_header_penalty: u8,
    /// Highest total still classified as clean.
    pub clean_max: u32,
    /// Highest total still classified as suspicious.
    pub suspicious_max: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            printable_ratio: 0.7,
            min_content_len: 5,
            recovery_max_bytes: 5000,
            chi_square_divisor: 10_000.0,
            histogram_divisor: 1000.0,
            correlation_divisor: 1.0,
            entropy_ceiling: 8.0,
            file_size_reference: 5 * 1024 * 1024,
            unknown_header_penalty: 15,
            clean_max: 40,
            suspicious_max: 75,
        }
    }
}

impl DetectorConfig {
    /// Parse an override document. Absent fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Tier for an aggregate `total`.
    pub fn classify(&self, total: u32) -> RiskLevel {
        if total <= self.clean_max {
            RiskLevel::Clean
        } else if total <= self.suspicious_max {
            RiskLevel::Suspicious
        } else {
            RiskLevel::HighRisk
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let cfg = DetectorConfig::from_json(r#"{ "min_content_len": 12, "clean_max": 30 }"#).unwrap();
        assert_eq!(cfg.min_content_len, 12);
        assert_eq!(cfg.clean_max, 30);
        assert_eq!(cfg.printable_ratio, 0.7);
        assert_eq!(cfg.suspicious_max, 75);
        assert_eq!(cfg.correlation_divisor, 1.0);
    }

    #[test]
    fn correlation_divisor_is_tunable() {
        let cfg = DetectorConfig::from_json(r#"{ "correlation_divisor": 4.0 }"#).unwrap();
        assert_eq!(cfg.correlation_divisor, 4.0);
        assert_eq!(cfg.histogram_divisor, 1000.0);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DetectorConfig::from_json("{}").unwrap(), DetectorConfig::default());
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(DetectorConfig::from_json(r#"{ "clean_max": "forty" }"#).is_err());
    }

    #[test]
    fn tier_boundaries() {
        let cfg = DetectorConfig::default();
        assert_eq!(cfg.classify(0), RiskLevel::Clean);
        assert_eq!(cfg.classify(40), RiskLevel::Clean);
        assert_eq!(cfg.classify(41), RiskLevel::Suspicious);
        assert_eq!(cfg.classify(75), RiskLevel::Suspicious);
        assert_eq!(cfg.classify(76), RiskLevel::HighRisk);
        assert_eq!(cfg.classify(125), RiskLevel::HighRisk);
    }
}
