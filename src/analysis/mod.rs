// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Blind steganalysis.
//!
//! [`Detector::analyze_image`] runs five statistical scorers (LSB balance,
//! entropy, histogram smoothness, neighbour correlation, pairs-of-values
//! chi-square), sums them into a 0..=125 total and classifies the result.
//! When the tier is not `Clean`, the raw LSB stream is read back and
//! surfaced if it looks like text.
//!
//! [`Detector::analyze_file`] applies the byte-level scorers to arbitrary
//! files. Their results land in the same report fields positionally:
//! `lsb_score` holds bit balance, `entropy_score` file entropy,
//! `histogram_score` the size anomaly, `correlation_score` the header check
//! and `chi_square_score` is always 0.

pub mod config;
pub mod file;
pub mod image;
pub mod recovery;
pub mod report;

use tracing::debug;

use crate::carrier::Carrier;
use crate::stego::error::StegoError;

pub use config::DetectorConfig;
pub use recovery::validate_content;
pub use report::{aggregate_scores, aggregate_with, AnalysisReport, AnalysisScore, RiskLevel, ScoreDetails};

/// Stateless detector holding its calibration.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Compute the five image sub-scores.
    #[cfg(not(feature = "parallel"))]
    pub fn image_scores(&self, carrier: &Carrier) -> ScoreDetails {
        let cfg = &self.config;
        ScoreDetails::clamped(
            image::lsb_score(carrier),
            image::entropy_score(carrier, cfg.entropy_ceiling),
            image::histogram_score(carrier, cfg.histogram_divisor),
            image::correlation_score(carrier, cfg.correlation_divisor),
            image::chi_square_score(carrier, cfg.chi_square_divisor),
        )
    }

    /// Compute the five image sub-scores concurrently.
    #[cfg(feature = "parallel")]
    pub fn image_scores(&self, carrier: &Carrier) -> ScoreDetails {
        let cfg = &self.config;
        let ((lsb, entropy), ((histogram, correlation), chi_square)) = rayon::join(
            || rayon::join(
                || image::lsb_score(carrier),
                || image::entropy_score(carrier, cfg.entropy_ceiling),
            ),
            || rayon::join(
                || rayon::join(
                    || image::histogram_score(carrier, cfg.histogram_divisor),
                    || image::correlation_score(carrier, cfg.correlation_divisor),
                ),
                || image::chi_square_score(carrier, cfg.chi_square_divisor),
            ),
        );
        ScoreDetails::clamped(lsb, entropy, histogram, correlation, chi_square)
    }

    /// Score a decoded image and attempt recovery if it is not clean.
    pub fn analyze_image(&self, carrier: &Carrier) -> AnalysisReport {
        let score = aggregate_with(&self.config, self.image_scores(carrier));
        debug!(
            width = carrier.width(),
            height = carrier.height(),
            total = score.total_score,
            risk = %score.risk_level,
            "image analysed"
        );

        if score.risk_level == RiskLevel::Clean {
            return AnalysisReport::without_content(score);
        }
        match recovery::recover_lsb_text(carrier, &self.config) {
            Some(text) => AnalysisReport::with_content(score, text),
            None => AnalysisReport::without_content(score),
        }
    }

    /// Decode `bytes` as an image and analyse it.
    ///
    /// # Errors
    /// [`StegoError::InvalidCarrierFormat`] if the bytes are not a
    /// decodable image.
    pub fn analyze_image_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport, StegoError> {
        let carrier = Carrier::decode(bytes)?;
        Ok(self.analyze_image(&carrier))
    }

    /// Byte-level analysis of an arbitrary file. Never attempts recovery.
    pub fn analyze_file(&self, data: &[u8]) -> AnalysisReport {
        let cfg = &self.config;
        let details = ScoreDetails::clamped(
            file::bit_distribution_score(data),
            file::entropy_score(data, cfg.entropy_ceiling),
            file::file_size_score(data.len() as u64, cfg.file_size_reference),
            file::header_score(data, cfg.unknown_header_penalty),
            0,
        );
        let score = aggregate_with(cfg, details);
        debug!(len = data.len(), total = score.total_score, risk = %score.risk_level, "file analysed");
        AnalysisReport::scores_only(score)
    }
}

/// [`Detector::analyze_image`] with default calibration.
pub fn analyze_image(carrier: &Carrier) -> AnalysisReport {
    Detector::default().analyze_image(carrier)
}

/// [`Detector::analyze_image_bytes`] with default calibration.
pub fn analyze_image_bytes(bytes: &[u8]) -> Result<AnalysisReport, StegoError> {
    Detector::default().analyze_image_bytes(bytes)
}

/// [`Detector::analyze_file`] with default calibration.
pub fn analyze_file(data: &[u8]) -> AnalysisReport {
    Detector::default().analyze_file(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_is_clean() {
        let c = Carrier::from_fn(8, 8, |_, _| [50, 50, 50]).unwrap();
        let r = analyze_image(&c);
        // Only the undefined correlation contributes.
        assert_eq!(r.details().correlation_score, 25);
        assert_eq!(r.total_score(), 25);
        assert_eq!(r.risk_level(), RiskLevel::Clean);
        assert!(!r.hidden_content_found);
        assert_eq!(r.message.as_deref(), Some(report::NO_CONTENT_MESSAGE));
    }

    #[test]
    fn correlation_divisor_reaches_scorer() {
        let c = Carrier::from_fn(8, 8, |_, _| [50, 50, 50]).unwrap();
        let cfg = DetectorConfig { correlation_divisor: 2.0, ..DetectorConfig::default() };
        let r = Detector::new(cfg).analyze_image(&c);
        assert_eq!(r.details().correlation_score, 12);
    }

    #[test]
    fn strict_thresholds_trigger_recovery() {
        let sample = |s: usize| if s % 8 == 2 { 65 } else { 64 };
        let cover = Carrier::from_fn(32, 32, |x, y| {
            let s = (y * 32 + x) * 3;
            [sample(s), sample(s + 1), sample(s + 2)]
        })
        .unwrap();
        let stego = crate::stego::lsb::embed(&cover, "hidden words here").unwrap();

        let cfg = DetectorConfig { clean_max: 0, ..DetectorConfig::default() };
        let r = Detector::new(cfg).analyze_image(&stego);
        assert_ne!(r.risk_level(), RiskLevel::Clean);
        assert!(r.hidden_content_found);
        assert_eq!(r.extracted_content.as_deref(), Some("hidden words here"));
        assert_eq!(r.message, None);
    }

    #[test]
    fn file_scores_map_positionally() {
        let mut data = b"%PDF-1.4\n".to_vec();
        data.extend((0..=255u8).cycle().take(4096));
        let r = analyze_file(&data);
        assert_eq!(r.details().correlation_score, 0);
        assert_eq!(r.details().chi_square_score, 0);
        assert_eq!(r.details().histogram_score, 0);
        assert!(r.details().entropy_score >= 24);
        assert!(!r.hidden_content_found);
        assert_eq!(r.extracted_content, None);
    }

    #[test]
    fn empty_file_scores_penalty_only() {
        let r = analyze_file(&[]);
        assert_eq!(r.total_score(), 15);
        assert_eq!(r.details().correlation_score, 15);
        assert_eq!(r.risk_level(), RiskLevel::Clean);
    }

    #[test]
    fn undecodable_bytes_are_rejected() {
        let err = analyze_image_bytes(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), "InvalidCarrierFormat");
    }
}
