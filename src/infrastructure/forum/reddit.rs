use crate::domain::errors::FetchError;
use crate::domain::items::{CandidateItem, FetchOutcome, SourceKind};
use crate::domain::ports::{ForumQuery, ForumSearchSource, RecencyFilter};
use crate::infrastructure::core::RequestPacer;
use crate::infrastructure::core::http_client_factory::build_url_with_query;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
const TOKEN_PATH: &str = "/api/v1/access_token";
const INSTALLED_CLIENT_GRANT: &str = "https://oauth.reddit.com/grants/installed_client";
const DEVICE_ID: &str = "DO_NOT_TRACK_THIS_DEVICE";
/// Tokens are refreshed this long before Reddit says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials. Without a secret the installed-client grant is used.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: PostData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostData {
    id: String,
    title: String,
    selftext: String,
    permalink: String,
    url: Option<String>,
    created_utc: Option<f64>,
    subreddit: Option<String>,
}

/// Reddit search, one community at a time, newest first.
///
/// Authenticates with OAuth when credentials are configured and falls back
/// to the public JSON endpoints otherwise. Every outbound call goes through
/// the pacer so sustained runs stay inside Reddit's rate limits.
pub struct RedditSearchService {
    client: ClientWithMiddleware,
    credentials: Option<RedditCredentials>,
    pacer: RequestPacer,
    token: Mutex<Option<AccessToken>>,
    public_base_url: String,
    oauth_base_url: String,
}

impl RedditSearchService {
    pub fn new(
        client: ClientWithMiddleware,
        credentials: Option<RedditCredentials>,
        pacer: RequestPacer,
    ) -> Self {
        Self {
            client,
            credentials: credentials.filter(|c| !c.client_id.trim().is_empty()),
            pacer,
            token: Mutex::new(None),
            public_base_url: PUBLIC_BASE_URL.to_string(),
            oauth_base_url: OAUTH_BASE_URL.to_string(),
        }
    }

    /// Points both the public and OAuth endpoints at `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.public_base_url = base_url.clone();
        self.oauth_base_url = base_url;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    async fn access_token(&self) -> Result<Option<String>, FetchError> {
        let Some(credentials) = &self.credentials else {
            return Ok(None);
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(Some(token.value.clone()));
            }
        }

        let token = self.request_token(credentials).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(Some(value))
    }

    async fn request_token(&self, credentials: &RedditCredentials) -> Result<AccessToken, FetchError> {
        let url = format!("{}{}", self.public_base_url, TOKEN_PATH);
        let form = token_form(credentials);

        self.pacer.wait().await;
        debug!("Requesting Reddit access token");
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &credentials.client_id,
                Some(credentials.client_secret.clone().unwrap_or_default()),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Authentication {
                reason: format!("token endpoint returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| FetchError::Parse {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        match (body.access_token, body.error) {
            (Some(value), None) => {
                let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
                info!("Obtained Reddit access token (valid {:?})", lifetime);
                Ok(AccessToken {
                    value,
                    expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
                })
            }
            (_, Some(error)) => Err(FetchError::Authentication { reason: error }),
            (None, None) => Err(FetchError::Authentication {
                reason: "token response without access_token".to_string(),
            }),
        }
    }

    async fn search_community(
        &self,
        community: &str,
        keyword: &str,
        limit: usize,
        recency: RecencyFilter,
    ) -> Result<Vec<CandidateItem>, FetchError> {
        if !is_valid_community_name(community) {
            return Err(FetchError::CommunityNotFound {
                community: community.to_string(),
            });
        }

        let token = self.access_token().await?;
        let base = match token {
            Some(_) => format!("{}/r/{}/search", self.oauth_base_url, community),
            None => format!("{}/r/{}/search.json", self.public_base_url, community),
        };
        let limit_value = limit.to_string();
        let url = build_url_with_query(
            &base,
            &[
                ("q", keyword),
                ("restrict_sr", "1"),
                ("sort", "new"),
                ("t", recency.as_query_value()),
                ("limit", limit_value.as_str()),
                ("raw_json", "1"),
            ],
        )
        .map_err(|e| FetchError::Transport {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        self.pacer.wait().await;
        debug!("Searching r/{} for '{}'", community, keyword);
        let mut request = self.client.get(&url);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::CommunityNotFound {
                community: community.to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            // Force a fresh token on the next call.
            *self.token.lock().await = None;
            return Err(FetchError::Authentication {
                reason: format!("search returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        // Unknown communities redirect to the community search page.
        if !response
            .url()
            .path()
            .to_lowercase()
            .starts_with(&format!("/r/{}/", community.to_lowercase()))
        {
            return Err(FetchError::CommunityNotFound {
                community: community.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        parse_listing(&bytes, community, limit).map_err(|reason| FetchError::Parse { url, reason })
    }
}

#[async_trait]
impl ForumSearchSource for RedditSearchService {
    async fn fetch_forum(&self, query: &ForumQuery) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for community in &query.communities {
            info!(
                "Searching r/{} for '{}' (t={}, limit {})",
                community, query.keyword, query.recency, query.limit_per_community
            );
            match self
                .search_community(
                    community,
                    &query.keyword,
                    query.limit_per_community,
                    query.recency,
                )
                .await
            {
                Ok(posts) => {
                    info!("r/{}: {} posts", community, posts.len());
                    outcome.items.extend(posts);
                }
                Err(e) => {
                    warn!("Error processing community r/{}: {}", community, e);
                    outcome
                        .warnings
                        .push(format!("Error processing r/{community}: {e}"));
                }
            }
        }

        outcome
    }
}

fn token_form(credentials: &RedditCredentials) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    match &credentials.client_secret {
        Some(secret) if !secret.is_empty() => {
            form.append_pair("grant_type", "client_credentials");
        }
        _ => {
            form.append_pair("grant_type", INSTALLED_CLIENT_GRANT);
            form.append_pair("device_id", DEVICE_ID);
        }
    }
    form.finish()
}

/// Reddit community names: 2-21 ASCII letters, digits or underscores.
pub fn is_valid_community_name(name: &str) -> bool {
    (2..=21).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turns a search listing into candidate items, keeping only posts (`t3`).
fn parse_listing(bytes: &[u8], community: &str, limit: usize) -> Result<Vec<CandidateItem>, String> {
    let listing: Listing = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    Ok(listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .take(limit)
        .map(|thing| {
            let post = thing.data;
            let link = if post.permalink.is_empty() {
                post.url.clone()
            } else {
                Some(format!("{}{}", PUBLIC_BASE_URL, post.permalink))
            };
            let mut item = CandidateItem::new(
                format!("reddit-{}", post.id),
                SourceKind::Forum,
                post.title.trim(),
                post.selftext.trim(),
            )
            .with_community(post.subreddit.unwrap_or_else(|| community.to_string()));
            if let Some(link) = link {
                item = item.with_link(link);
            }
            if let Some(published) = post
                .created_utc
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0))
            {
                item = item.with_published(published);
            }
            item
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::core::HttpClientFactory;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": null,
            "children": [
                {"kind": "t3", "data": {"id": "abc", "title": "Tesla deliveries beat", "selftext": "Huge quarter for tesla",
                  "permalink": "/r/stocks/comments/abc/tesla_deliveries_beat/", "url": "https://i.redd.it/x.png",
                  "created_utc": 1760450400.0, "subreddit": "stocks"}},
                {"kind": "t3", "data": {"id": "def", "title": "Is TSLA overvalued?", "selftext": "",
                  "permalink": "/r/stocks/comments/def/is_tsla_overvalued/", "created_utc": 1760446800.0, "subreddit": "stocks"}},
                {"kind": "t5", "data": {"id": "ghi", "display_name": "teslamotors"}}
            ]
        }
    }"#;

    #[test]
    fn test_parse_listing_maps_posts() {
        let items = parse_listing(LISTING.as_bytes(), "stocks", 10).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.id, "reddit-abc");
        assert_eq!(first.source, SourceKind::Forum);
        assert_eq!(first.title, "Tesla deliveries beat");
        assert_eq!(first.body, "Huge quarter for tesla");
        assert_eq!(
            first.link.as_deref(),
            Some("https://www.reddit.com/r/stocks/comments/abc/tesla_deliveries_beat/")
        );
        assert_eq!(first.community.as_deref(), Some("stocks"));
        assert_eq!(
            first.published.map(|p| p.timestamp()),
            Some(1_760_450_400)
        );
    }

    #[test]
    fn test_parse_listing_respects_limit() {
        let items = parse_listing(LISTING.as_bytes(), "stocks", 1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "reddit-abc");
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        assert!(parse_listing(b"<html>", "stocks", 5).is_err());
    }

    #[test]
    fn test_community_name_validation() {
        assert!(is_valid_community_name("stocks"));
        assert!(is_valid_community_name("wall_street_bets"));
        assert!(!is_valid_community_name("a"));
        assert!(!is_valid_community_name("../etc"));
        assert!(!is_valid_community_name("two words"));
    }

    #[test]
    fn test_token_form_grants() {
        let with_secret = RedditCredentials {
            client_id: "id".to_string(),
            client_secret: Some("secret".to_string()),
        };
        assert_eq!(token_form(&with_secret), "grant_type=client_credentials");

        let installed = RedditCredentials {
            client_id: "id".to_string(),
            client_secret: None,
        };
        let form = token_form(&installed);
        assert!(form.contains("grant_type=https%3A%2F%2Foauth.reddit.com%2Fgrants%2Finstalled_client"));
        assert!(form.contains("device_id=DO_NOT_TRACK_THIS_DEVICE"));
    }

    #[test]
    fn test_blank_client_id_means_anonymous() {
        let service = RedditSearchService::new(
            HttpClientFactory::create_client_with("test", 0),
            Some(RedditCredentials {
                client_id: " ".to_string(),
                client_secret: None,
            }),
            RequestPacer::disabled(),
        );
        assert!(!service.is_authenticated());
    }

    #[tokio::test]
    async fn test_failing_communities_do_not_abort() {
        let service = RedditSearchService::new(
            HttpClientFactory::create_client_with("test", 0),
            None,
            RequestPacer::disabled(),
        )
        .with_base_url("http://127.0.0.1:9");

        let query = ForumQuery {
            keyword: "tesla".to_string(),
            communities: vec![
                "stocks".to_string(),
                "not a community".to_string(),
                "teslamotors".to_string(),
            ],
            limit_per_community: 5,
            recency: RecencyFilter::Day,
        };
        let outcome = service.fetch_forum(&query).await;
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.warnings.len(), 3);
        assert!(outcome.warnings[1].contains("not a community"));
    }

    fn paced_query(communities: &[&str]) -> ForumQuery {
        ForumQuery {
            keyword: "tesla".to_string(),
            communities: communities.iter().map(|c| c.to_string()).collect(),
            limit_per_community: 5,
            recency: RecencyFilter::Day,
        }
    }

    #[tokio::test]
    async fn test_searches_are_spaced_by_pacer() {
        let interval = Duration::from_millis(150);
        let service = RedditSearchService::new(
            HttpClientFactory::create_client_with("test", 0),
            None,
            RequestPacer::new(interval),
        )
        .with_base_url("http://127.0.0.1:9");

        let start = std::time::Instant::now();
        let outcome = service
            .fetch_forum(&paced_query(&["stocks", "teslamotors", "investing"]))
            .await;

        assert_eq!(outcome.warnings.len(), 3);
        assert!(
            start.elapsed() >= interval * 2,
            "three searches need two full intervals, took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_token_requests_are_paced_too() {
        let interval = Duration::from_millis(150);
        let service = RedditSearchService::new(
            HttpClientFactory::create_client_with("test", 0),
            Some(RedditCredentials {
                client_id: "id".to_string(),
                client_secret: Some("secret".to_string()),
            }),
            RequestPacer::new(interval),
        )
        .with_base_url("http://127.0.0.1:9");

        // Each community first asks for a token; the dead port makes that fail.
        let start = std::time::Instant::now();
        let outcome = service.fetch_forum(&paced_query(&["stocks", "teslamotors"])).await;

        assert_eq!(outcome.warnings.len(), 2);
        assert!(start.elapsed() >= interval);
    }
}
