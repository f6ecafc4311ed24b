use crate::application::analysis_service::{
    AnalysisLimits, FORUM_LIMIT_MAX, FORUM_LIMIT_MIN, NEWS_LIMIT_MAX, NEWS_LIMIT_MIN,
};
use crate::domain::ports::RecencyFilter;
use crate::domain::watchlist::{Watchlist, parse_ticker_list};
use crate::infrastructure::classifier::huggingface::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::infrastructure::news::rss::DEFAULT_FEED_URL_TEMPLATE;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Yahoo Finance RSS + Reddit
    Live,
    /// Canned items, no network access for sources
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'live' or 'mock'", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// Remote pretrained model via the Hugging Face inference API
    HuggingFace,
    /// Local VADER lexicon
    Lexicon,
}

impl FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(ClassifierBackend::HuggingFace),
            "lexicon" | "vader" => Ok(ClassifierBackend::Lexicon),
            _ => anyhow::bail!(
                "Invalid CLASSIFIER_BACKEND: {}. Must be 'huggingface' or 'lexicon'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub tickers: Vec<String>,
    pub news_item_limit: usize,
    pub forum_item_limit: usize,
    pub forum_time_filter: RecencyFilter,
    /// Minimum spacing between forum API calls; zero disables pacing
    pub forum_request_delay: Duration,
    pub news_feed_url_template: String,
    // Reddit
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    // Classifier
    pub classifier_backend: ClassifierBackend,
    pub classifier_model: String,
    pub hf_api_url: String,
    pub hf_api_token: String,
    /// Character pre-trim; the remote model also truncates at its token limit
    pub classifier_max_input_chars: usize,
    pub http_max_retries: u32,
    pub watchlist: Watchlist,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mode = Mode::from_str(&var("MODE", "live"))?;

        let tickers = parse_ticker_list(&var("TICKERS", "META,AAPL,TSLA"));

        let news_item_limit = var("NEWS_ITEM_LIMIT", "20")
            .parse::<usize>()
            .context("Failed to parse NEWS_ITEM_LIMIT")?;
        if !(NEWS_LIMIT_MIN..=NEWS_LIMIT_MAX).contains(&news_item_limit) {
            anyhow::bail!(
                "NEWS_ITEM_LIMIT must be between {} and {}, got {}",
                NEWS_LIMIT_MIN,
                NEWS_LIMIT_MAX,
                news_item_limit
            );
        }

        let forum_item_limit = var("FORUM_ITEM_LIMIT", "10")
            .parse::<usize>()
            .context("Failed to parse FORUM_ITEM_LIMIT")?;
        if !(FORUM_LIMIT_MIN..=FORUM_LIMIT_MAX).contains(&forum_item_limit) {
            anyhow::bail!(
                "FORUM_ITEM_LIMIT must be between {} and {}, got {}",
                FORUM_LIMIT_MIN,
                FORUM_LIMIT_MAX,
                forum_item_limit
            );
        }

        let forum_time_filter = RecencyFilter::from_str(&var("FORUM_TIME_FILTER", "day"))?;

        let forum_request_delay_ms = var("FORUM_REQUEST_DELAY_MS", "1000")
            .parse::<u64>()
            .context("Failed to parse FORUM_REQUEST_DELAY_MS")?;

        let news_feed_url_template = var("NEWS_FEED_URL_TEMPLATE", DEFAULT_FEED_URL_TEMPLATE);
        if !news_feed_url_template.contains("{ticker}") {
            anyhow::bail!(
                "NEWS_FEED_URL_TEMPLATE must contain a {{ticker}} placeholder: {}",
                news_feed_url_template
            );
        }

        let reddit_client_id = var("REDDIT_CLIENT_ID", "");
        let reddit_client_secret = var("REDDIT_CLIENT_SECRET", "");
        let reddit_user_agent = var(
            "REDDIT_USER_AGENT",
            concat!("financial sentiment analyzer (finpulse/", env!("CARGO_PKG_VERSION"), ")"),
        );

        let classifier_backend = ClassifierBackend::from_str(&var("CLASSIFIER_BACKEND", "huggingface"))?;
        let classifier_model = var("CLASSIFIER_MODEL", DEFAULT_MODEL);
        let hf_api_url = var("HF_API_URL", DEFAULT_API_URL);
        let hf_api_token = var("HF_API_TOKEN", "");

        let classifier_max_input_chars = var("CLASSIFIER_MAX_INPUT_CHARS", "2000")
            .parse::<usize>()
            .context("Failed to parse CLASSIFIER_MAX_INPUT_CHARS")?;

        let http_max_retries = var("HTTP_MAX_RETRIES", "3")
            .parse::<u32>()
            .context("Failed to parse HTTP_MAX_RETRIES")?;

        let watchlist = match lookup("WATCHLIST_FILE").filter(|p| !p.trim().is_empty()) {
            Some(path) => Watchlist::builtin().merge(Self::load_watchlist(Path::new(&path))?),
            None => Watchlist::builtin(),
        };

        Ok(Self {
            mode,
            tickers,
            news_item_limit,
            forum_item_limit,
            forum_time_filter,
            forum_request_delay: Duration::from_millis(forum_request_delay_ms),
            news_feed_url_template,
            reddit_client_id,
            reddit_client_secret,
            reddit_user_agent,
            classifier_backend,
            classifier_model,
            hf_api_url,
            hf_api_token,
            classifier_max_input_chars,
            http_max_retries,
            watchlist,
        })
    }

    /// Reads a TOML watchlist:
    ///
    /// ```toml
    /// [tickers.NVDA]
    /// keyword = "nvidia"
    /// communities = ["nvidia", "stocks"]
    /// ```
    pub fn load_watchlist(path: &Path) -> Result<Watchlist> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read watchlist file {}", path.display()))?;
        Self::parse_watchlist(&content)
            .with_context(|| format!("Failed to parse watchlist file {}", path.display()))
    }

    pub fn parse_watchlist(content: &str) -> Result<Watchlist> {
        Ok(toml::from_str(content)?)
    }

    /// Problems that do not stop startup but are likely to empty the results.
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.classifier_backend == ClassifierBackend::HuggingFace
            && self.hf_api_token.trim().is_empty()
        {
            warnings.push(format!(
                "HF_API_TOKEN is not set: requests to {} are unauthenticated and may be rejected, \
                 which skips every item. Set a token or use CLASSIFIER_BACKEND=lexicon",
                self.hf_api_url
            ));
        }
        warnings
    }

    pub fn limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            news_items: self.news_item_limit,
            forum_items_per_community: self.forum_item_limit,
            recency: self.forum_time_filter,
        }
    }
}
