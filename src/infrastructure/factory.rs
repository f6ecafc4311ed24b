use crate::application::analysis_service::AnalysisService;
use crate::config::{ClassifierBackend, Config, Mode};
use crate::domain::ports::{ForumSearchSource, NewsFeedSource};
use crate::domain::sentiment::SentimentClassifier;
use crate::infrastructure::classifier::{HuggingFaceClassifier, LexiconClassifier};
use crate::infrastructure::core::http_client_factory::DEFAULT_USER_AGENT;
use crate::infrastructure::core::{HttpClientFactory, RequestPacer};
use crate::infrastructure::forum::{MockForumService, RedditCredentials, RedditSearchService};
use crate::infrastructure::news::{MockNewsService, RssNewsService};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ServiceFactory;

impl ServiceFactory {
    /// Builds the classifier once; it is shared by every ticker and source.
    pub fn create_classifier(config: &Config) -> Arc<dyn SentimentClassifier> {
        match config.classifier_backend {
            ClassifierBackend::HuggingFace => {
                let client = HttpClientFactory::create_client_with(
                    DEFAULT_USER_AGENT,
                    config.http_max_retries,
                );
                let classifier = HuggingFaceClassifier::new(
                    client,
                    &config.hf_api_url,
                    config.classifier_model.clone(),
                    Some(config.hf_api_token.clone()),
                    config.classifier_max_input_chars,
                );
                info!("Classifier: {} via {}", config.classifier_model, classifier.endpoint());
                Arc::new(classifier)
            }
            ClassifierBackend::Lexicon => {
                info!("Classifier: offline lexicon");
                Arc::new(LexiconClassifier::new(config.classifier_max_input_chars))
            }
        }
    }

    pub fn create_pacer(config: &Config) -> RequestPacer {
        if config.forum_request_delay.is_zero() {
            RequestPacer::disabled()
        } else {
            RequestPacer::new(config.forum_request_delay)
        }
    }

    pub fn create_sources(
        config: &Config,
    ) -> (Arc<dyn NewsFeedSource>, Arc<dyn ForumSearchSource>) {
        match config.mode {
            Mode::Mock => {
                info!("Mode: mock (canned news and forum items)");
                (
                    Arc::new(MockNewsService::new()),
                    Arc::new(MockForumService::new()),
                )
            }
            Mode::Live => {
                let news_client = HttpClientFactory::create_client_with(
                    DEFAULT_USER_AGENT,
                    config.http_max_retries,
                );
                let news = RssNewsService::new(news_client, config.news_feed_url_template.clone());

                // Reddit rejects generic agents, so the forum client sends the configured one.
                let forum_client = HttpClientFactory::create_client_with(
                    &config.reddit_user_agent,
                    config.http_max_retries,
                );
                let credentials = RedditCredentials {
                    client_id: config.reddit_client_id.clone(),
                    client_secret: Some(config.reddit_client_secret.clone())
                        .filter(|s| !s.trim().is_empty()),
                };
                let pacer = Self::create_pacer(config);
                let forum_pacing = pacer.min_interval();
                let forum = RedditSearchService::new(forum_client, Some(credentials), pacer);
                info!(
                    "Mode: live (Reddit {}, {:?} between calls)",
                    if forum.is_authenticated() { "OAuth" } else { "public search" },
                    forum_pacing
                );

                (Arc::new(news), Arc::new(forum))
            }
        }
    }

    pub fn create_analysis_service(config: &Config) -> AnalysisService {
        for warning in config.startup_warnings() {
            warn!("{}", warning);
        }
        let classifier = Self::create_classifier(config);
        let (news, forum) = Self::create_sources(config);
        AnalysisService::new(classifier, news, forum, config.watchlist.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis_service::AnalysisRequest;
    use std::collections::HashMap;

    fn mock_lexicon_config() -> Config {
        let vars: HashMap<&str, &str> = [("MODE", "mock"), ("CLASSIFIER_BACKEND", "lexicon")]
            .into_iter()
            .collect();
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    #[test]
    fn test_classifier_backend_selection() {
        let config = mock_lexicon_config();
        assert!(ServiceFactory::create_classifier(&config).name().starts_with("lexicon"));
    }

    #[test]
    fn test_pacer_follows_configured_delay() {
        let config = mock_lexicon_config();
        let pacer = ServiceFactory::create_pacer(&config);
        assert!(pacer.is_enabled());
        assert_eq!(pacer.min_interval(), std::time::Duration::from_secs(1));

        let mut config = mock_lexicon_config();
        config.forum_request_delay = std::time::Duration::ZERO;
        assert!(!ServiceFactory::create_pacer(&config).is_enabled());
    }

    #[tokio::test]
    async fn test_mock_mode_runs_offline() {
        let config = mock_lexicon_config();
        let service = ServiceFactory::create_analysis_service(&config);
        let request = AnalysisRequest::new(config.tickers.clone(), config.limits());

        let report = service.analyze(&request).await.unwrap();
        assert_eq!(report.tickers.len(), 3);
        assert!(report.tickers.iter().all(|t| t.news.fetched > 0));
        assert!(report.tickers.iter().all(|t| t.forum.warnings.is_empty()));
    }
}
