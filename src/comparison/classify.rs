//! Threshold-based match labels for similarity scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the band below the threshold labelled borderline
pub const BORDERLINE_BAND: f32 = 0.10;

pub const DEFAULT_THRESHOLD: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    LikelyMatch,
    Borderline,
    NoMatch,
}

impl Classification {
    /// `score >= threshold` is a likely match, within 0.10 below it borderline
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score >= threshold {
            Classification::LikelyMatch
        } else if score >= threshold - BORDERLINE_BAND {
            Classification::Borderline
        } else {
            Classification::NoMatch
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::LikelyMatch => "Likely match",
            Classification::Borderline => "Borderline",
            Classification::NoMatch => "No match",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an optional score; absent scores have no label
pub fn classify(score: Option<f32>, threshold: f32) -> Option<Classification> {
    score.map(|s| Classification::from_score(s, threshold))
}
