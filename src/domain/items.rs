use crate::domain::sentiment::{Classification, SentimentLabel, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a candidate item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Per-ticker syndication feed (Yahoo Finance headlines)
    News,
    /// Forum search results (Reddit)
    Forum,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::News => "Yahoo Finance",
            Self::Forum => "Reddit",
        }
    }

    /// Noun used in "No matching ... found" messages.
    pub fn item_noun(&self) -> &'static str {
        match self {
            Self::News => "articles",
            Self::Forum => "posts",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A raw fetched unit, before relevance filtering or classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub source: SourceKind,
    pub title: String,
    /// Feed summary or post self-text
    pub body: String,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    /// Forum community the post was found in
    pub community: Option<String>,
}

impl CandidateItem {
    pub fn new(
        id: impl Into<String>,
        source: SourceKind,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            title: title.into(),
            body: body.into(),
            link: None,
            published: None,
            community: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = Some(community.into());
        self
    }

    /// Title and body joined, as used by the relevance filter.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.body).trim().to_string()
    }

    /// Text submitted to the classifier.
    ///
    /// News entries are scored on their summary (falling back to the title),
    /// forum posts on title plus body.
    pub fn scoring_text(&self) -> String {
        match self.source {
            SourceKind::News if !self.body.trim().is_empty() => self.body.trim().to_string(),
            SourceKind::News => self.title.trim().to_string(),
            SourceKind::Forum => self.combined_text(),
        }
    }
}

/// A candidate item plus the classifier's verdict on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item: CandidateItem,
    pub classification: Classification,
}

impl ClassifiedItem {
    pub fn new(item: CandidateItem, classification: Classification) -> Self {
        Self {
            item,
            classification,
        }
    }

    pub fn label(&self) -> SentimentLabel {
        self.classification.label
    }

    pub fn confidence(&self) -> f64 {
        self.classification.confidence
    }
}

/// Outcome of scoring one (ticker, source) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub final_score: f64,
    pub verdict: Verdict,
    pub positive_count: usize,
    pub negative_count: usize,
    /// Informational only, neutral items never enter the score
    pub neutral_count: usize,
    /// Every classified item in input order, neutral ones included
    pub items: Vec<ClassifiedItem>,
}

impl AggregateResult {
    pub fn empty() -> Self {
        Self {
            final_score: 0.0,
            verdict: Verdict::Neutral,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            items: Vec::new(),
        }
    }

    /// Items that contributed to the score (positive + negative).
    pub fn num_analyzed(&self) -> usize {
        self.positive_count + self.negative_count
    }

    pub fn has_analyzed_items(&self) -> bool {
        self.num_analyzed() > 0
    }
}

impl Default for AggregateResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Items returned by a fetcher plus the failures it recovered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub items: Vec<CandidateItem>,
    pub warnings: Vec<String>,
}

impl FetchOutcome {
    pub fn new(items: Vec<CandidateItem>) -> Self {
        Self {
            items,
            warnings: Vec::new(),
        }
    }

    pub fn failed(warning: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            warnings: vec![warning.into()],
        }
    }
}
