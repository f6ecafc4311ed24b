//! Batch sentiment analysis
//!
//! Runs the same pipeline as the dashboard for a list of tickers and prints
//! the per-source verdicts to stdout.
//!
//! # Usage
//! ```sh
//! cargo run --bin analyze -- --tickers META,AAPL --forum-limit 25 --verbose
//! cargo run --bin analyze -- -t TSLA --subreddits TSLA=teslamotors,teslainvestorsclub --csv tsla.csv
//! MODE=mock cargo run --bin analyze
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use finpulse::application::analysis_service::{AnalysisReport, AnalysisRequest};
use finpulse::application::reporting::SentimentReporter;
use finpulse::config::{ClassifierBackend, Config, Mode};
use finpulse::domain::errors::AnalysisError;
use finpulse::domain::ports::RecencyFilter;
use finpulse::domain::watchlist::{parse_community_list, parse_ticker_list};
use finpulse::infrastructure::ServiceFactory;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ticker(s) to analyze (comma separated). Defaults to TICKERS from the environment
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    tickers: Vec<String>,

    /// Subreddit override for one ticker, e.g. AAPL=apple,investing (repeatable)
    #[arg(long = "subreddits", value_name = "TICKER=SUBS")]
    subreddits: Vec<String>,

    /// Relevant news articles per ticker (1-50)
    #[arg(long)]
    news_limit: Option<usize>,

    /// Posts per subreddit (1-100)
    #[arg(long)]
    forum_limit: Option<usize>,

    /// Reddit time filter: hour, day, week, month, year, all
    #[arg(long)]
    time_filter: Option<String>,

    /// Classifier backend: huggingface or lexicon
    #[arg(long)]
    classifier: Option<String>,

    /// Use canned items instead of Yahoo Finance and Reddit
    #[arg(long)]
    mock: bool,

    /// Do not pace Reddit requests
    #[arg(long)]
    no_delay: bool,

    /// Print every classified item
    #[arg(short, long)]
    verbose: bool,

    /// Export classified items as CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Export the full report as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) -> Result<()> {
        if !self.tickers.is_empty() {
            config.tickers = parse_ticker_list(&self.tickers.join(","));
        }
        if let Some(limit) = self.news_limit {
            config.news_item_limit = limit;
        }
        if let Some(limit) = self.forum_limit {
            config.forum_item_limit = limit;
        }
        if let Some(filter) = &self.time_filter {
            config.forum_time_filter = RecencyFilter::from_str(filter)?;
        }
        if let Some(backend) = &self.classifier {
            config.classifier_backend = ClassifierBackend::from_str(backend)?;
        }
        if self.mock {
            config.mode = Mode::Mock;
        }
        if self.no_delay {
            config.forum_request_delay = Duration::ZERO;
        }
        Ok(())
    }

    fn request(&self, config: &Config) -> Result<AnalysisRequest> {
        let mut request = AnalysisRequest::new(config.tickers.clone(), config.limits());
        for entry in &self.subreddits {
            let (ticker, communities) = entry
                .split_once('=')
                .with_context(|| format!("--subreddits must be TICKER=SUB1,SUB2, got '{}'", entry))?;
            request = request.with_communities(ticker, parse_community_list(communities));
        }
        Ok(request)
    }
}

/// A run without tickers is reported as a warning, not a failure.
fn completed_or_warned(
    result: Result<AnalysisReport, AnalysisError>,
) -> Result<Option<AnalysisReport>> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(AnalysisError::NoTickers) => {
            warn!("No tickers supplied, nothing to analyze");
            println!("⚠️  Please enter at least one ticker (--tickers META,AAPL or TICKERS=...).");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.apply_to(&mut config)?;
    info!(
        "Configuration loaded: Mode={:?}, Classifier={:?}, Tickers={:?}",
        config.mode, config.classifier_backend, config.tickers
    );

    let request = cli.request(&config)?;
    let service = ServiceFactory::create_analysis_service(&config);
    let Some(report) = completed_or_warned(service.analyze(&request).await)? else {
        return Ok(());
    };

    let reporter = SentimentReporter::new(cli.verbose);
    reporter.print_report(&report);

    if let Some(path) = &cli.csv {
        reporter.export_csv(&report, path)?;
    }
    if let Some(path) = &cli.json {
        reporter.export_json(&report, path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tickers_is_a_warning_not_an_error() {
        assert!(matches!(completed_or_warned(Err(AnalysisError::NoTickers)), Ok(None)));
    }

    #[test]
    fn test_invalid_limits_still_fail() {
        let result = completed_or_warned(Err(AnalysisError::InvalidLimit {
            source_name: "news",
            value: 0,
            min: 1,
            max: 50,
        }));
        assert!(result.is_err());
    }
}
