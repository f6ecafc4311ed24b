use thiserror::Error;

/// Errors raised while classifying a single text.
///
/// Callers skip the offending item; a classification error never aborts a run.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Cannot classify empty text")]
    EmptyInput,

    #[error("Classifier returned unexpected label: {0}")]
    UnexpectedLabel(String),

    #[error("Classifier returned invalid confidence: {0}")]
    InvalidConfidence(f64),

    #[error("Classifier backend error: {reason}")]
    Backend { reason: String },

    #[error("Classifier returned malformed response: {reason}")]
    MalformedResponse { reason: String },
}

/// Errors raised by news feed and forum search transports.
///
/// Fetchers convert these into warnings and partial results.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse response from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Community not found: {community}")]
    CommunityNotFound { community: String },
}

/// Errors surfaced to the user before any analysis is attempted.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No tickers supplied")]
    NoTickers,

    #[error("Invalid item limit for {source_name}: {value} not in {min}..={max}")]
    InvalidLimit {
        source_name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}
