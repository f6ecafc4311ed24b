//! Score accumulator shared by every source.
//!
//! Positive items add their confidence, negative items subtract it and
//! neutral items are ignored. The final score is the signed total divided by
//! the number of positive and negative items, or 0.0 when there are none.

use crate::domain::items::{AggregateResult, ClassifiedItem};
use crate::domain::sentiment::{SentimentLabel, Verdict};

pub fn accumulate(items: Vec<ClassifiedItem>) -> AggregateResult {
    let mut positive_count = 0;
    let mut negative_count = 0;
    let mut neutral_count = 0;
    let mut contributions = Vec::with_capacity(items.len());

    for item in &items {
        match item.label() {
            SentimentLabel::Positive => positive_count += 1,
            SentimentLabel::Negative => negative_count += 1,
            SentimentLabel::Neutral => neutral_count += 1,
        }
        if let Some(signed) = item.classification.signed_score() {
            contributions.push(signed);
        }
    }

    // Summed in sorted order so the score does not depend on input order.
    contributions.sort_by(f64::total_cmp);
    let total: f64 = contributions.iter().sum();

    let num_analyzed = positive_count + negative_count;
    let final_score = if num_analyzed > 0 {
        total / num_analyzed as f64
    } else {
        0.0
    };

    AggregateResult {
        final_score,
        verdict: Verdict::from_score(final_score),
        positive_count,
        negative_count,
        neutral_count,
        items,
    }
}
