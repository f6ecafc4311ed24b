use crate::domain::errors::FetchError;
use crate::domain::items::{CandidateItem, FetchOutcome, SourceKind};
use crate::domain::ports::NewsFeedSource;
use crate::domain::relevance;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use rss::Channel;
use std::io::Cursor;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_FEED_URL_TEMPLATE: &str = "https://finance.yahoo.com/rss/headline?s={ticker}";

/// Per-ticker RSS headline feed (Yahoo Finance by default).
pub struct RssNewsService {
    client: ClientWithMiddleware,
    url_template: String,
}

impl RssNewsService {
    /// `url_template` must contain a `{ticker}` placeholder.
    pub fn new(client: ClientWithMiddleware, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn feed_url(&self, ticker: &str) -> String {
        self.url_template
            .replace("{ticker}", &ticker.trim().to_uppercase())
    }

    async fn fetch_channel(&self, url: &str) -> Result<Channel, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        parse_channel(&bytes).map_err(|reason| FetchError::Parse {
            url: url.to_string(),
            reason,
        })
    }
}

#[async_trait]
impl NewsFeedSource for RssNewsService {
    async fn fetch_news(&self, ticker: &str, keyword: &str, limit: usize) -> FetchOutcome {
        let url = self.feed_url(ticker);
        info!("Fetching news feed for {} from {}", ticker, url);

        match self.fetch_channel(&url).await {
            Ok(channel) => {
                let entries = channel_entries(&channel);
                let total = entries.len();
                let items = select_relevant(entries, keyword, limit);
                info!(
                    "News feed for {}: {} entries, {} relevant to '{}' (limit {})",
                    ticker,
                    total,
                    items.len(),
                    keyword,
                    limit
                );
                FetchOutcome::new(items)
            }
            Err(e) => {
                warn!("News feed for {} unavailable: {}", ticker, e);
                FetchOutcome::failed(format!("News feed for {ticker} unavailable: {e}"))
            }
        }
    }
}

pub fn parse_channel(bytes: &[u8]) -> Result<Channel, String> {
    Channel::read_from(Cursor::new(bytes)).map_err(|e| e.to_string())
}

/// Converts every feed entry into a candidate item, keeping feed order.
pub fn channel_entries(channel: &Channel) -> Vec<CandidateItem> {
    channel
        .items()
        .iter()
        .map(|entry| {
            let id = entry
                .guid()
                .map(|g| g.value.to_string())
                .or_else(|| entry.link().map(|l| l.to_string()))
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let mut item = CandidateItem::new(
                id,
                SourceKind::News,
                entry.title().unwrap_or_default().trim(),
                entry.description().unwrap_or_default().trim(),
            );
            if let Some(link) = entry.link() {
                item = item.with_link(link);
            }
            if let Some(published) = entry.pub_date().and_then(parse_pub_date) {
                item = item.with_published(published);
            }
            item
        })
        .collect()
}

/// Keeps the first `limit` entries mentioning `keyword`.
///
/// The limit counts relevant entries, not raw ones.
pub fn select_relevant(
    entries: Vec<CandidateItem>,
    keyword: &str,
    limit: usize,
) -> Vec<CandidateItem> {
    entries
        .into_iter()
        .filter(|entry| {
            let relevant = relevance::matches(entry, keyword);
            if !relevant {
                debug!("Skipping irrelevant entry: {}", entry.title);
            }
            relevant
        })
        .take(limit)
        .collect()
}

// RSS dates are RFC-2822 usually.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
