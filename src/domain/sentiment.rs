use crate::domain::errors::ClassifierError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scores at or above this are reported as [`Verdict::Positive`].
pub const POSITIVE_THRESHOLD: f64 = 0.15;
/// Scores at or below this are reported as [`Verdict::Negative`].
pub const NEGATIVE_THRESHOLD: f64 = -0.15;

/// Top label predicted by the classifier for a single text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(ClassifierError::UnexpectedLabel(other.to_string())),
        }
    }
}

/// Normalized classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Probability of `label`, in [0, 1]
    pub confidence: f64,
}

impl Classification {
    /// Builds a classification, rejecting non-finite confidences and clamping the rest to [0, 1].
    pub fn new(label: SentimentLabel, confidence: f64) -> Result<Self, ClassifierError> {
        if !confidence.is_finite() {
            return Err(ClassifierError::InvalidConfidence(confidence));
        }
        Ok(Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    /// Signed contribution to a source score: +confidence, -confidence or nothing for neutral.
    pub fn signed_score(&self) -> Option<f64> {
        match self.label {
            SentimentLabel::Positive => Some(self.confidence),
            SentimentLabel::Negative => Some(-self.confidence),
            SentimentLabel::Neutral => None,
        }
    }
}

/// Three-way verdict derived from an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Positive => "#00E676", // Green
            Self::Negative => "#FF1744", // Red
            Self::Neutral => "#808080",  // Gray
        }
    }
}

/// A pretrained text classifier consumed as a black box.
///
/// Implementations are built once at startup and shared behind an `Arc`;
/// they hold no per-call mutable state, so a single instance can serve every
/// ticker and source of a run.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify one text. Over-long input is truncated to the backend's limit, not rejected.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Human readable backend name, shown in logs and reports.
    fn name(&self) -> &str;
}
