use crate::domain::items::{CandidateItem, FetchOutcome, SourceKind};
use crate::domain::ports::{ForumQuery, ForumSearchSource};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{info, warn};

/// Offline forum search.
///
/// Serves fixed posts per community when given, generated posts otherwise.
/// Communities marked as failing produce a warning instead of posts, and
/// every searched community is recorded for assertions.
#[derive(Default)]
pub struct MockForumService {
    posts: Option<HashMap<String, Vec<CandidateItem>>>,
    failing: HashSet<String>,
    searched: Mutex<Vec<String>>,
}

impl MockForumService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: HashMap<String, Vec<CandidateItem>>) -> Self {
        Self {
            posts: Some(posts),
            ..Self::default()
        }
    }

    pub fn failing_community(mut self, community: impl Into<String>) -> Self {
        self.failing.insert(community.into());
        self
    }

    /// Communities searched so far, in call order.
    pub fn searched_communities(&self) -> Vec<String> {
        self.searched
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn generated(community: &str, keyword: &str) -> Vec<CandidateItem> {
        let now = Utc::now();
        [
            (
                format!("Loading up on {keyword} before earnings"),
                format!("I think {keyword} is going to beat, fundamentals look great."),
            ),
            (
                format!("Sold all my {keyword} today"),
                "Valuation is getting scary and guidance was weak.".to_string(),
            ),
            (
                "Daily discussion thread".to_string(),
                "What are you all watching today?".to_string(),
            ),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (title, body))| {
            CandidateItem::new(format!("mock-{community}-{i}"), SourceKind::Forum, title, body)
                .with_link(format!("https://www.reddit.com/r/{community}/comments/mock{i}/"))
                .with_community(community)
                .with_published(now - Duration::minutes(30 * i as i64))
        })
        .collect()
    }
}

#[async_trait]
impl ForumSearchSource for MockForumService {
    async fn fetch_forum(&self, query: &ForumQuery) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for community in &query.communities {
            if let Ok(mut searched) = self.searched.lock() {
                searched.push(community.clone());
            }

            if self.failing.contains(community) {
                warn!("Mock forum: r/{} failed", community);
                outcome
                    .warnings
                    .push(format!("Error processing r/{community}: simulated failure"));
                continue;
            }

            let posts = match &self.posts {
                Some(posts) => posts.get(community).cloned().unwrap_or_default(),
                None => Self::generated(community, &query.keyword),
            };
            outcome
                .items
                .extend(posts.into_iter().take(query.limit_per_community));
        }

        info!("Mock forum: {} posts for '{}'", outcome.items.len(), query.keyword);
        outcome
    }
}
