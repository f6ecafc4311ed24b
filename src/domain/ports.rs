use crate::domain::items::FetchOutcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time window applied by the forum source to its search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyFilter {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl RecencyFilter {
    pub const ALL: [RecencyFilter; 6] = [
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
        Self::All,
    ];

    pub fn as_query_value(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl fmt::Display for RecencyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

impl FromStr for RecencyFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            _ => anyhow::bail!(
                "Invalid time filter: {}. Must be one of hour, day, week, month, year, all",
                s
            ),
        }
    }
}

/// One forum search across several communities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumQuery {
    pub keyword: String,
    pub communities: Vec<String>,
    pub limit_per_community: usize,
    pub recency: RecencyFilter,
}

/// Per-ticker news feed.
///
/// Implementations never fail: transport and parse errors become warnings on
/// an empty or partial [`FetchOutcome`].
#[async_trait]
pub trait NewsFeedSource: Send + Sync {
    /// Up to `limit` entries relevant to `keyword`, in feed order.
    async fn fetch_news(&self, ticker: &str, keyword: &str, limit: usize) -> FetchOutcome;
}

/// Forum search, newest first.
///
/// A failing community is logged and skipped; the remaining communities are
/// still searched.
#[async_trait]
pub trait ForumSearchSource: Send + Sync {
    /// Results of every community concatenated in the order given.
    async fn fetch_forum(&self, query: &ForumQuery) -> FetchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_filter_parsing() {
        assert_eq!("DAY".parse::<RecencyFilter>().unwrap(), RecencyFilter::Day);
        assert_eq!(" week".parse::<RecencyFilter>().unwrap(), RecencyFilter::Week);
        assert!("fortnight".parse::<RecencyFilter>().is_err());
        assert_eq!(RecencyFilter::default(), RecencyFilter::Day);
        assert_eq!(RecencyFilter::All.as_query_value(), "all");
    }
}
