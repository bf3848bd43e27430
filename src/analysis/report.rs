// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Detector result model and score aggregation.
//!
//! Serialized shape:
//!
//! ```text
//! { "total_score": 0..=125,
//!   "risk_level": "Clean" | "Suspicious" | "High Risk",
//!   "details": { "lsb_score", "entropy_score", "histogram_score",
//!                "correlation_score", "chi_square_score": 0..=25 },
//!   "hidden_content_found": bool,
//!   "extracted_content"?: string,
//!   "message"?: string }
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::config::DetectorConfig;

/// Upper bound of every sub-score.
pub const MAX_SUB_SCORE: u8 = 25;

/// Message attached to a report when nothing was recovered.
pub const NO_CONTENT_MESSAGE: &str = "No valid hidden content found.";

/// Coarse classification of the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Clean,
    Suspicious,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Suspicious => "Suspicious",
            Self::HighRisk => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five sub-scores, each in `0..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub lsb_score: u8,
    pub entropy_score: u8,
    pub histogram_score: u8,
    pub correlation_score: u8,
    pub chi_square_score: u8,
}

impl ScoreDetails {
    /// Build from raw scores, clamping each to `0..=25`.
    pub fn clamped(lsb: u8, entropy: u8, histogram: u8, correlation: u8, chi_square: u8) -> Self {
        Self {
            lsb_score: lsb.min(MAX_SUB_SCORE),
            entropy_score: entropy.min(MAX_SUB_SCORE),
            histogram_score: histogram.min(MAX_SUB_SCORE),
            correlation_score: correlation.min(MAX_SUB_SCORE),
            chi_square_score: chi_square.min(MAX_SUB_SCORE),
        }
    }

    pub fn total(&self) -> u32 {
        [
            self.lsb_score,
            self.entropy_score,
            self.histogram_score,
            self.correlation_score,
            self.chi_square_score,
        ]
        .iter()
        .map(|&s| u32::from(s))
        .sum()
    }
}

/// Aggregate score with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisScore {
    pub total_score: u32,
    pub risk_level: RiskLevel,
    pub details: ScoreDetails,
}

/// Sum the five sub-scores and classify with the default thresholds.
pub fn aggregate_scores(lsb: u8, entropy: u8, histogram: u8, correlation: u8, chi_square: u8) -> AnalysisScore {
    aggregate_with(
        &DetectorConfig::default(),
        ScoreDetails::clamped(lsb, entropy, histogram, correlation, chi_square),
    )
}

/// Sum already-built sub-scores and classify with `config`'s thresholds.
pub fn aggregate_with(config: &DetectorConfig, details: ScoreDetails) -> AnalysisScore {
    let details = ScoreDetails::clamped(
        details.lsb_score,
        details.entropy_score,
        details.histogram_score,
        details.correlation_score,
        details.chi_square_score,
    );
    let total_score = details.total();
    AnalysisScore { total_score, risk_level: config.classify(total_score), details }
}

/// Full detector output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub score: AnalysisScore,
    pub hidden_content_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisReport {
    /// Report with recovered text.
    pub fn with_content(score: AnalysisScore, content: String) -> Self {
        Self { score, hidden_content_found: true, extracted_content: Some(content), message: None }
    }

    /// Report where nothing plausible was recovered.
    pub fn without_content(score: AnalysisScore) -> Self {
        Self {
            score,
            hidden_content_found: false,
            extracted_content: None,
            message: Some(NO_CONTENT_MESSAGE.to_string()),
        }
    }

    /// Report for a byte-level file scan, where recovery is never attempted.
    pub fn scores_only(score: AnalysisScore) -> Self {
        Self { score, hidden_content_found: false, extracted_content: None, message: None }
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.score.risk_level
    }

    pub fn total_score(&self) -> u32 {
        self.score.total_score
    }

    pub fn details(&self) -> &ScoreDetails {
        &self.score.details
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
