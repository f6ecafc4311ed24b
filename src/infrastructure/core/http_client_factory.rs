use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("finpulse/", env!("CARGO_PKG_VERSION"));

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware
    pub fn create_client() -> ClientWithMiddleware {
        Self::create_client_with(DEFAULT_USER_AGENT, 3)
    }

    /// Creates a client sending `user_agent` that retries transient failures
    /// (connect errors, 5xx, 429) up to `max_retries` times with exponential backoff.
    ///
    /// `max_retries == 0` disables the retry layer entirely.
    pub fn create_client_with(user_agent: &str, max_retries: u32) -> ClientWithMiddleware {
        let client = Client::builder()
            .user_agent(user_agent)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        if max_retries == 0 {
            return ClientBuilder::new(client).build();
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Helper function to build a URL with query parameters.
/// reqwest-middleware's request builder has no `.query()`, so the query
/// string is encoded into the URL up front.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<String, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let url = Url::parse_with_params(
        base_url,
        params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
    )?;
    Ok(url.to_string())
}
