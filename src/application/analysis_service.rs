//! Sentiment analysis pipeline
//!
//! For each ticker, sequentially: fetch news, fetch forum posts, keep the
//! items mentioning the ticker's keyword, classify them one by one and
//! accumulate a score per source. Failures are recovered where they happen
//! (a dead feed, a missing community, an unclassifiable item) so one bad
//! source never prevents the others from being reported.

use crate::domain::aggregation::accumulate;
use crate::domain::errors::AnalysisError;
use crate::domain::items::{AggregateResult, CandidateItem, ClassifiedItem, SourceKind};
use crate::domain::ports::{ForumQuery, ForumSearchSource, NewsFeedSource, RecencyFilter};
use crate::domain::relevance;
use crate::domain::sentiment::SentimentClassifier;
use crate::domain::watchlist::{TickerProfile, Watchlist};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NEWS_LIMIT_MIN: usize = 1;
pub const NEWS_LIMIT_MAX: usize = 50;
pub const FORUM_LIMIT_MIN: usize = 1;
pub const FORUM_LIMIT_MAX: usize = 100;

/// How many items each source may contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    /// Relevant news entries per ticker
    pub news_items: usize,
    /// Search results per community
    pub forum_items_per_community: usize,
    pub recency: RecencyFilter,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            news_items: 20,
            forum_items_per_community: 10,
            recency: RecencyFilter::Day,
        }
    }
}

impl AnalysisLimits {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(NEWS_LIMIT_MIN..=NEWS_LIMIT_MAX).contains(&self.news_items) {
            return Err(AnalysisError::InvalidLimit {
                source_name: "news",
                value: self.news_items,
                min: NEWS_LIMIT_MIN,
                max: NEWS_LIMIT_MAX,
            });
        }
        if !(FORUM_LIMIT_MIN..=FORUM_LIMIT_MAX).contains(&self.forum_items_per_community) {
            return Err(AnalysisError::InvalidLimit {
                source_name: "forum",
                value: self.forum_items_per_community,
                min: FORUM_LIMIT_MIN,
                max: FORUM_LIMIT_MAX,
            });
        }
        Ok(())
    }
}

/// One user-triggered run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    /// Per-ticker community overrides, keyed by uppercase ticker
    pub community_overrides: HashMap<String, Vec<String>>,
    pub limits: AnalysisLimits,
}

impl AnalysisRequest {
    pub fn new(tickers: Vec<String>, limits: AnalysisLimits) -> Self {
        Self {
            tickers,
            community_overrides: HashMap::new(),
            limits,
        }
    }

    pub fn with_communities(mut self, ticker: &str, communities: Vec<String>) -> Self {
        if !communities.is_empty() {
            self.community_overrides
                .insert(ticker.trim().to_uppercase(), communities);
        }
        self
    }
}

/// Result of one (ticker, source) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceKind,
    pub result: AggregateResult,
    /// Candidates returned by the fetcher
    pub fetched: usize,
    /// Candidates that passed the keyword filter
    pub matched: usize,
    /// Matched items the classifier could not score
    pub classification_failures: usize,
    pub warnings: Vec<String>,
}

impl SourceReport {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            result: AggregateResult::empty(),
            fetched: 0,
            matched: 0,
            classification_failures: 0,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    pub profile: TickerProfile,
    pub news: SourceReport,
    pub forum: SourceReport,
}

impl TickerReport {
    pub fn ticker(&self) -> &str {
        &self.profile.ticker
    }

    pub fn source(&self, source: SourceKind) -> &SourceReport {
        match source {
            SourceKind::News => &self.news,
            SourceKind::Forum => &self.forum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub classifier: String,
    pub tickers: Vec<TickerReport>,
}

pub struct AnalysisService {
    classifier: Arc<dyn SentimentClassifier>,
    news: Arc<dyn NewsFeedSource>,
    forum: Arc<dyn ForumSearchSource>,
    watchlist: Watchlist,
}

impl AnalysisService {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        news: Arc<dyn NewsFeedSource>,
        forum: Arc<dyn ForumSearchSource>,
        watchlist: Watchlist,
    ) -> Self {
        Self {
            classifier,
            news,
            forum,
            watchlist,
        }
    }

    pub fn profile_for(&self, ticker: &str, request: &AnalysisRequest) -> TickerProfile {
        let overrides = request
            .community_overrides
            .get(&ticker.trim().to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default();
        self.watchlist.profile(ticker, overrides)
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_with_progress(request, |_| {}).await
    }

    /// Runs every ticker in order, calling `on_ticker` as each one completes.
    pub async fn analyze_with_progress<F>(
        &self,
        request: &AnalysisRequest,
        mut on_ticker: F,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        F: FnMut(&TickerReport) + Send,
    {
        if request.tickers.is_empty() {
            return Err(AnalysisError::NoTickers);
        }
        request.limits.validate()?;

        let started_at = Utc::now();
        info!(
            "Analyzing sentiment for {} with classifier {}",
            request.tickers.join(", "),
            self.classifier.name()
        );

        let mut tickers = Vec::with_capacity(request.tickers.len());
        for ticker in &request.tickers {
            let profile = self.profile_for(ticker, request);
            let report = self.analyze_ticker(&profile, &request.limits).await;
            on_ticker(&report);
            tickers.push(report);
        }

        Ok(AnalysisReport {
            started_at,
            finished_at: Utc::now(),
            classifier: self.classifier.name().to_string(),
            tickers,
        })
    }

    pub async fn analyze_ticker(&self, profile: &TickerProfile, limits: &AnalysisLimits) -> TickerReport {
        info!(
            "===== {} ===== keyword '{}', communities {:?}",
            profile.ticker, profile.keyword, profile.communities
        );

        let news = self.analyze_news(profile, limits.news_items).await;
        let forum = self.analyze_forum(profile, limits).await;

        TickerReport {
            profile: profile.clone(),
            news,
            forum,
        }
    }

    pub async fn analyze_news(&self, profile: &TickerProfile, limit: usize) -> SourceReport {
        let outcome = self
            .news
            .fetch_news(&profile.ticker, &profile.keyword, limit)
            .await;

        let mut report = self
            .score_candidates(SourceKind::News, outcome.items, &profile.keyword)
            .await;
        prepend_warnings(&mut report, outcome.warnings);
        log_source_report(&profile.ticker, &report);
        report
    }

    pub async fn analyze_forum(&self, profile: &TickerProfile, limits: &AnalysisLimits) -> SourceReport {
        let query = ForumQuery {
            keyword: profile.keyword.clone(),
            communities: profile.communities.clone(),
            limit_per_community: limits.forum_items_per_community,
            recency: limits.recency,
        };
        let outcome = self.forum.fetch_forum(&query).await;

        let mut report = self
            .score_candidates(SourceKind::Forum, outcome.items, &profile.keyword)
            .await;
        prepend_warnings(&mut report, outcome.warnings);
        log_source_report(&profile.ticker, &report);
        report
    }

    /// Filters, classifies and accumulates one batch of candidates.
    ///
    /// Items the classifier rejects are skipped and counted, never fatal.
    pub async fn score_candidates(
        &self,
        source: SourceKind,
        candidates: Vec<CandidateItem>,
        keyword: &str,
    ) -> SourceReport {
        let fetched = candidates.len();
        let matched_items = relevance::filter_relevant(candidates, keyword);
        let matched = matched_items.len();

        let mut classified = Vec::with_capacity(matched);
        let mut classification_failures = 0;
        let mut warnings = Vec::new();

        for item in matched_items {
            let text = item.scoring_text();
            match self.classifier.classify(&text).await {
                Ok(classification) => {
                    debug!(
                        "{} | {} | {} ({:.4})",
                        source, item.title, classification.label, classification.confidence
                    );
                    classified.push(ClassifiedItem::new(item, classification));
                }
                Err(e) => {
                    warn!("Error processing {} item '{}': {}", source, item.title, e);
                    classification_failures += 1;
                    warnings.push(format!("Skipped '{}': {}", item.title, e));
                }
            }
        }

        SourceReport {
            source,
            result: accumulate(classified),
            fetched,
            matched,
            classification_failures,
            warnings,
        }
    }
}

fn prepend_warnings(report: &mut SourceReport, mut fetch_warnings: Vec<String>) {
    fetch_warnings.append(&mut report.warnings);
    report.warnings = fetch_warnings;
}

fn log_source_report(ticker: &str, report: &SourceReport) {
    let result = &report.result;
    if result.has_analyzed_items() {
        info!(
            "{} {} Sentiment: {} ({:.4}) | positive {} | negative {} | neutral {}",
            ticker,
            report.source,
            result.verdict,
            result.final_score,
            result.positive_count,
            result.negative_count,
            result.neutral_count
        );
    } else {
        info!(
            "{} {}: No matching {} found for sentiment analysis.",
            ticker,
            report.source,
            report.source.item_noun()
        );
    }
}
