use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Per-ticker defaults: the relevance keyword and the communities to search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerDefaults {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub communities: Vec<String>,
}

/// Known tickers and their defaults, keyed by uppercase symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    #[serde(default)]
    pub tickers: BTreeMap<String, TickerDefaults>,
}

/// Everything needed to analyze one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub ticker: String,
    pub keyword: String,
    pub communities: Vec<String>,
}

impl Watchlist {
    /// The tickers the dashboard ships with.
    pub fn builtin() -> Self {
        let mut tickers = BTreeMap::new();
        for (ticker, keyword, communities) in [
            ("META", "meta", ["technology", "stocks"]),
            ("AAPL", "apple", ["apple", "stocks"]),
            ("TSLA", "tesla", ["teslamotors", "stocks"]),
        ] {
            tickers.insert(
                ticker.to_string(),
                TickerDefaults {
                    keyword: Some(keyword.to_string()),
                    communities: communities.iter().map(|c| c.to_string()).collect(),
                },
            );
        }
        Self { tickers }
    }

    /// Entries of `other` replace entries of `self` with the same ticker.
    pub fn merge(mut self, other: Watchlist) -> Self {
        for (ticker, defaults) in other.tickers {
            self.tickers.insert(ticker.trim().to_uppercase(), defaults);
        }
        self
    }

    /// Resolves keyword and communities for `ticker`.
    ///
    /// Communities come from `override_communities` when non-empty, then the
    /// watchlist, then the ticker itself. The keyword falls back to the
    /// lowercase ticker.
    pub fn profile(&self, ticker: &str, override_communities: &[String]) -> TickerProfile {
        let ticker = ticker.trim().to_uppercase();
        let defaults = self.tickers.get(&ticker);

        let keyword = defaults
            .and_then(|d| d.keyword.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| ticker.to_lowercase());

        let communities = if !override_communities.is_empty() {
            override_communities.to_vec()
        } else {
            match defaults {
                Some(d) if !d.communities.is_empty() => d.communities.clone(),
                _ => vec![ticker.clone()],
            }
        };

        TickerProfile {
            ticker,
            keyword,
            communities,
        }
    }
}

/// Parses "META, aapl,,tsla" into `["META", "AAPL", "TSLA"]`, dropping blanks and repeats.
pub fn parse_ticker_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Parses "stocks, r/apple" into `["stocks", "apple"]`.
pub fn parse_community_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|c| {
            let c = c.trim();
            c.strip_prefix("r/")
                .or_else(|| c.strip_prefix("/r/"))
                .unwrap_or(c)
                .trim()
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}
