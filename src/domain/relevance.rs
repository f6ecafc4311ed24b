//! Keyword relevance filter.
//!
//! A plain case-insensitive substring check over title and body. Crude on
//! purpose: "meta" matches "metadata" and misses "Facebook".

use crate::domain::items::CandidateItem;

/// True when `keyword` occurs in the item's title or body, ignoring case.
///
/// Items whose combined text is empty never match.
pub fn matches(item: &CandidateItem, keyword: &str) -> bool {
    let combined = item.combined_text();
    if combined.is_empty() {
        return false;
    }
    combined
        .to_lowercase()
        .contains(&keyword.trim().to_lowercase())
}

/// Keeps the items matching `keyword`, in their original order.
pub fn filter_relevant(items: Vec<CandidateItem>, keyword: &str) -> Vec<CandidateItem> {
    items
        .into_iter()
        .filter(|item| matches(item, keyword))
        .collect()
}
