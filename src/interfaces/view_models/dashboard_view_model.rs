use crate::application::analysis_service::{
    AnalysisLimits, AnalysisReport, AnalysisRequest, TickerReport,
};
use crate::application::worker::AnalysisEvent;
use crate::config::Config;
use crate::domain::errors::AnalysisError;
use crate::domain::ports::RecencyFilter;
use crate::domain::watchlist::{Watchlist, parse_community_list, parse_ticker_list};
use std::collections::{BTreeMap, VecDeque};

const MAX_LOG_LINES: usize = 1000;

/// What the dashboard shows and edits, independent of egui.
pub struct DashboardViewModel {
    pub tickers_input: String,
    /// Raw community override text per ticker; blank means watchlist defaults
    pub community_inputs: BTreeMap<String, String>,
    pub news_limit: usize,
    pub forum_limit: usize,
    pub recency: RecencyFilter,
    pub running: bool,
    pub has_run: bool,
    pub error: Option<String>,
    /// Tickers finished so far in the current run
    pub progress: Vec<TickerReport>,
    pub report: Option<AnalysisReport>,
    pub logs: VecDeque<String>,
    watchlist: Watchlist,
}

impl DashboardViewModel {
    pub fn new(watchlist: Watchlist, tickers: &[String], limits: AnalysisLimits) -> Self {
        Self {
            tickers_input: tickers.join(", "),
            community_inputs: BTreeMap::new(),
            news_limit: limits.news_items,
            forum_limit: limits.forum_items_per_community,
            recency: limits.recency,
            running: false,
            has_run: false,
            error: None,
            progress: Vec::new(),
            report: None,
            logs: VecDeque::new(),
            watchlist,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.watchlist.clone(), &config.tickers, config.limits())
    }

    pub fn tickers(&self) -> Vec<String> {
        parse_ticker_list(&self.tickers_input)
    }

    /// Comma-joined default communities, shown as the override field's hint.
    pub fn default_communities(&self, ticker: &str) -> String {
        self.watchlist.profile(ticker, &[]).communities.join(", ")
    }

    pub fn limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            news_items: self.news_limit,
            forum_items_per_community: self.forum_limit,
            recency: self.recency,
        }
    }

    pub fn build_request(&self) -> Result<AnalysisRequest, AnalysisError> {
        let tickers = self.tickers();
        if tickers.is_empty() {
            return Err(AnalysisError::NoTickers);
        }
        let limits = self.limits();
        limits.validate()?;

        let mut request = AnalysisRequest::new(tickers.clone(), limits);
        for ticker in &tickers {
            if let Some(raw) = self.community_inputs.get(ticker) {
                request = request.with_communities(ticker, parse_community_list(raw));
            }
        }
        Ok(request)
    }

    pub fn apply_event(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::Started { .. } => {
                self.running = true;
                self.error = None;
                self.progress.clear();
            }
            AnalysisEvent::TickerCompleted(report) => self.progress.push(report),
            AnalysisEvent::Finished(report) => {
                self.running = false;
                self.has_run = true;
                self.progress.clear();
                self.report = Some(report);
            }
            AnalysisEvent::Rejected(reason) => {
                self.running = false;
                self.error = Some(reason);
            }
        }
    }

    pub fn push_log(&mut self, line: String) {
        self.logs.push_back(line.trim_end().to_string());
        while self.logs.len() > MAX_LOG_LINES {
            self.logs.pop_front();
        }
    }

    /// Partial results while running, the last complete report otherwise.
    pub fn results(&self) -> &[TickerReport] {
        if self.running {
            return &self.progress;
        }
        self.report
            .as_ref()
            .map(|r| r.tickers.as_slice())
            .unwrap_or_default()
    }
}
