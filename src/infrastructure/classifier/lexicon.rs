//! Offline lexicon classifier using VADER
//!
//! Scores text with the VADER (Valence Aware Dictionary and sEntiment
//! Reasoner) algorithm, boosted with financial keywords, and maps the
//! compound score onto a positive/negative/neutral label with a confidence.
//! Used when no remote model is configured and in mock mode.
//!
//! # Example
//! ```rust,ignore
//! use finpulse::infrastructure::classifier::LexiconClassifier;
//!
//! let classifier = LexiconClassifier::new(2000);
//! let result = classifier.classify("Tesla surges to a record high").await?;
//! assert_eq!(result.label, SentimentLabel::Positive);
//! ```

use crate::domain::errors::ClassifierError;
use crate::domain::sentiment::{Classification, SentimentClassifier, SentimentLabel};
use crate::infrastructure::classifier::truncate_chars;
use async_trait::async_trait;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound scores inside (-NEUTRAL_BAND, NEUTRAL_BAND) are labelled neutral.
const NEUTRAL_BAND: f64 = 0.05;

/// Financial keywords and their sentiment scores for boosting VADER analysis.
/// These help capture market jargon that VADER's general lexicon misses.
const BULLISH_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 0.4),
    ("surges", 0.4),
    ("rally", 0.4),
    ("rallies", 0.4),
    ("soar", 0.5),
    ("soars", 0.5),
    ("skyrocket", 0.6),
    ("bullish", 0.5),
    ("all-time high", 0.5),
    ("record high", 0.4),
    ("beats estimates", 0.4),
    ("beat expectations", 0.4),
    ("raised guidance", 0.4),
    ("upgrade", 0.3),
    ("outperform", 0.3),
    ("buyback", 0.2),
    ("dividend hike", 0.3),
    ("breakout", 0.3),
    ("partnership", 0.2),
    ("breakthrough", 0.4),
];

const BEARISH_KEYWORDS: &[(&str, f64)] = &[
    ("crash", -0.5),
    ("crashes", -0.5),
    ("plunge", -0.5),
    ("plunges", -0.5),
    ("tumble", -0.4),
    ("tumbles", -0.4),
    ("bearish", -0.5),
    ("downgrade", -0.4),
    ("underperform", -0.3),
    ("misses estimates", -0.4),
    ("cut guidance", -0.4),
    ("lawsuit", -0.4),
    ("probe", -0.3),
    ("investigation", -0.3),
    ("recall", -0.3),
    ("layoffs", -0.3),
    ("fraud", -0.5),
    ("sell-off", -0.4),
    ("selloff", -0.4),
    ("bankruptcy", -0.6),
];

/// VADER with financial boosting, exposed as a sentiment classifier.
///
/// Construction loads the lexicon once; classification is read-only, so one
/// instance is shared by every caller.
pub struct LexiconClassifier {
    analyzer: SentimentIntensityAnalyzer<'static>,
    max_input_chars: usize,
}

impl LexiconClassifier {
    pub fn new(max_input_chars: usize) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            max_input_chars,
        }
    }

    /// Calculate financial keyword boost for the given text.
    fn financial_boost(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();

        BULLISH_KEYWORDS
            .iter()
            .chain(BEARISH_KEYWORDS.iter())
            .filter(|(keyword, _)| text_lower.contains(keyword))
            .map(|(_, score)| score)
            .sum()
    }

    /// Sentiment score between -1.0 and 1.0: VADER's compound score plus
    /// half the financial boost, clamped.
    pub fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        let vader_score = scores["compound"];
        let combined = vader_score + (self.financial_boost(text) * 0.5);
        combined.clamp(-1.0, 1.0)
    }

    /// Maps a score onto a label. Confidence is the score's magnitude for
    /// polar labels and its distance from the polar range for neutral.
    pub fn label_score(score: f64) -> (SentimentLabel, f64) {
        if score >= NEUTRAL_BAND {
            (SentimentLabel::Positive, score)
        } else if score <= -NEUTRAL_BAND {
            (SentimentLabel::Negative, -score)
        } else {
            (SentimentLabel::Neutral, 1.0 - score.abs())
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let text = truncate_chars(text.trim(), self.max_input_chars);
        if text.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        let (label, confidence) = Self::label_score(self.score(text));
        Classification::new(label, confidence)
    }

    fn name(&self) -> &str {
        "lexicon (VADER + financial keywords)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bullish_headlines() {
        let classifier = LexiconClassifier::default();

        let bullish_headlines = [
            "Tesla surges to a record high as deliveries beat expectations",
            "Apple rallies after analysts upgrade the stock to outperform",
            "Meta soars as ad revenue growth accelerates",
        ];

        for headline in bullish_headlines {
            let result = classifier.classify(headline).await.unwrap();
            assert_eq!(
                result.label,
                SentimentLabel::Positive,
                "Expected positive label for '{}', got {:?}",
                headline,
                result
            );
            assert!(result.confidence > 0.0 && result.confidence <= 1.0);
        }
    }

    #[tokio::test]
    async fn test_bearish_headlines() {
        let classifier = LexiconClassifier::default();

        let bearish_headlines = [
            "Tesla shares plunge after massive recall and fraud lawsuit",
            "Apple stock tumbles on downgrade, sell-off deepens",
            "Meta crashes as regulators open investigation",
        ];

        for headline in bearish_headlines {
            let result = classifier.classify(headline).await.unwrap();
            assert_eq!(
                result.label,
                SentimentLabel::Negative,
                "Expected negative label for '{}', got {:?}",
                headline,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_error() {
        let classifier = LexiconClassifier::default();
        assert!(matches!(
            classifier.classify("   ").await,
            Err(ClassifierError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_not_rejected() {
        let classifier = LexiconClassifier::new(512);
        let text = "Shares rally on strong results. ".repeat(1000);
        assert!(classifier.classify(&text).await.is_ok());
    }

    #[test]
    fn test_label_score_bands() {
        assert_eq!(
            LexiconClassifier::label_score(0.6),
            (SentimentLabel::Positive, 0.6)
        );
        assert_eq!(
            LexiconClassifier::label_score(-0.4),
            (SentimentLabel::Negative, 0.4)
        );
        let (label, confidence) = LexiconClassifier::label_score(0.01);
        assert_eq!(label, SentimentLabel::Neutral);
        assert!((confidence - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_financial_boost() {
        let classifier = LexiconClassifier::default();

        let generic_positive = classifier.score("This is good news");
        let financial_positive = classifier.score("This is good news, shares surge in a bullish rally");

        assert!(
            financial_positive > generic_positive,
            "Financial boosting should increase positive scores"
        );
    }
}
