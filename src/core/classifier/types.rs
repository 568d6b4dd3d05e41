//! Classifier output types

use serde::{Deserialize, Serialize};

/// Label whose score decides the verdict, matched case-insensitively
pub const UNSAFE_LABEL: &str = "nsfw";

/// Scores strictly above this are unsafe
pub const UNSAFE_THRESHOLD: f64 = 0.5;

/// One `(label, score)` pair produced by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Safety decision derived from a prediction list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_nsfw: bool,
    /// Confidence in the verdict, in `[0, 100]`, rounded to 2 decimals
    pub confidence_percentage: f64,
}

impl Verdict {
    /// Derive the verdict from the unsafe-label score.
    ///
    /// A missing unsafe label counts as score 0. If the label appears more
    /// than once the last occurrence wins. Scores are clamped into `[0, 1]`
    /// and NaN counts as 0.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let score = predictions
            .iter()
            .rev()
            .find(|p| p.label.eq_ignore_ascii_case(UNSAFE_LABEL))
            .map(|p| p.score)
            .unwrap_or(0.0);

        Self::from_unsafe_score(score)
    }

    pub fn from_unsafe_score(score: f64) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };

        let is_nsfw = score > UNSAFE_THRESHOLD;
        let confidence = if is_nsfw { score } else { 1.0 - score };

        Self {
            is_nsfw,
            confidence_percentage: round2(confidence * 100.0),
        }
    }
}

/// Body of a successful `POST /v1/detect` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub file_name: String,
    pub is_nsfw: bool,
    pub confidence_percentage: f64,
}

impl Detection {
    pub fn new(file_name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            file_name: file_name.into(),
            is_nsfw: verdict.is_nsfw,
            confidence_percentage: verdict.confidence_percentage,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
