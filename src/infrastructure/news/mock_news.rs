use crate::domain::items::{CandidateItem, FetchOutcome, SourceKind};
use crate::domain::ports::NewsFeedSource;
use crate::infrastructure::news::rss::select_relevant;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::info;

/// Offline news feed.
///
/// Without fixed items it generates a handful of headlines mentioning the
/// requested keyword, so the dashboard can be demoed without network access.
pub struct MockNewsService {
    items: Option<Vec<CandidateItem>>,
    failure: Option<String>,
}

impl MockNewsService {
    pub fn new() -> Self {
        Self {
            items: None,
            failure: None,
        }
    }

    /// Serves exactly `items` for every ticker (still keyword-filtered and limited).
    pub fn with_items(items: Vec<CandidateItem>) -> Self {
        Self {
            items: Some(items),
            failure: None,
        }
    }

    /// Simulates an unreachable feed.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            items: None,
            failure: Some(reason.into()),
        }
    }

    fn generated(ticker: &str, keyword: &str) -> Vec<CandidateItem> {
        let now = Utc::now();
        let headlines = [
            (
                format!("{ticker} shares surge after strong quarterly earnings"),
                format!("Analysts say {keyword} beat revenue expectations and raised guidance."),
            ),
            (
                format!("{ticker} faces regulatory probe"),
                format!("Regulators opened an investigation into {keyword}, weighing on the stock."),
            ),
            (
                format!("What to watch for {ticker} this week"),
                format!("Investors await the {keyword} product event on Thursday."),
            ),
            (
                "Broader market closes flat".to_string(),
                "Major indices ended the session little changed.".to_string(),
            ),
        ];

        headlines
            .into_iter()
            .enumerate()
            .map(|(i, (title, summary))| {
                CandidateItem::new(format!("mock-news-{ticker}-{i}"), SourceKind::News, title, summary)
                    .with_link(format!("https://finance.example.com/{ticker}/{i}"))
                    .with_published(now - Duration::hours(i as i64))
            })
            .collect()
    }
}

impl Default for MockNewsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsFeedSource for MockNewsService {
    async fn fetch_news(&self, ticker: &str, keyword: &str, limit: usize) -> FetchOutcome {
        if let Some(reason) = &self.failure {
            return FetchOutcome::failed(format!("News feed for {ticker} unavailable: {reason}"));
        }

        let entries = match &self.items {
            Some(items) => items.clone(),
            None => Self::generated(ticker, keyword),
        };
        let items = select_relevant(entries, keyword, limit);
        info!("Mock news feed for {}: {} items", ticker, items.len());
        FetchOutcome::new(items)
    }
}
