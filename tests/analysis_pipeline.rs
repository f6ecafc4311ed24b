use async_trait::async_trait;
use finpulse::application::analysis_service::{AnalysisLimits, AnalysisRequest, AnalysisService};
use finpulse::domain::errors::{AnalysisError, ClassifierError};
use finpulse::domain::items::{CandidateItem, SourceKind};
use finpulse::domain::sentiment::{Classification, SentimentClassifier, SentimentLabel, Verdict};
use finpulse::domain::watchlist::Watchlist;
use finpulse::infrastructure::forum::MockForumService;
use finpulse::infrastructure::news::MockNewsService;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// --- Keyword-driven classifier ---
struct ScriptedClassifier {
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for ScriptedClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        if lower.contains("garbled") {
            return Err(ClassifierError::Backend {
                reason: "model overloaded".to_string(),
            });
        }
        if lower.contains("surge") {
            Classification::new(SentimentLabel::Positive, 0.9)
        } else if lower.contains("probe") {
            Classification::new(SentimentLabel::Negative, 0.7)
        } else {
            Classification::new(SentimentLabel::Neutral, 0.6)
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn news(id: &str, title: &str, summary: &str) -> CandidateItem {
    CandidateItem::new(id, SourceKind::News, title, summary)
}

fn post(id: &str, community: &str, title: &str, body: &str) -> CandidateItem {
    CandidateItem::new(id, SourceKind::Forum, title, body).with_community(community)
}

fn service(
    classifier: Arc<ScriptedClassifier>,
    news: MockNewsService,
    forum: Arc<MockForumService>,
) -> AnalysisService {
    AnalysisService::new(classifier, Arc::new(news), forum, Watchlist::builtin())
}

fn request(tickers: &[&str]) -> AnalysisRequest {
    AnalysisRequest::new(
        tickers.iter().map(|t| t.to_string()).collect(),
        AnalysisLimits::default(),
    )
}

#[tokio::test]
async fn test_mixed_news_scores_only_polar_items() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let news_items = vec![
        news("1", "Meta shares surge", "Meta shares surge on earnings"),
        news("2", "Meta faces probe", "Regulators open a Meta probe"),
        news("3", "Meta event Thursday", "Meta hosts its developer event"),
        news("4", "Apple shares surge", "Apple shares surge on iPhone sales"),
    ];
    let forum = Arc::new(MockForumService::with_posts(HashMap::new()));
    let service = service(classifier.clone(), MockNewsService::with_items(news_items), forum);

    let report = service.analyze(&request(&["META"])).await.unwrap();
    let meta = &report.tickers[0];

    assert_eq!(meta.ticker(), "META");
    assert_eq!(meta.news.fetched, 3);
    assert_eq!(meta.news.matched, 3);
    assert_eq!(meta.news.result.positive_count, 1);
    assert_eq!(meta.news.result.negative_count, 1);
    assert_eq!(meta.news.result.neutral_count, 1);
    assert!((meta.news.result.final_score - 0.1).abs() < 1e-9);
    assert_eq!(meta.news.result.verdict, Verdict::Neutral);
    // The irrelevant Apple headline never reaches the classifier.
    assert_eq!(classifier.calls(), 3);

    assert!(!meta.forum.result.has_analyzed_items());
    assert_eq!(meta.forum.result.final_score, 0.0);
    assert_eq!(report.classifier, "scripted");
}

#[tokio::test]
async fn test_failed_community_does_not_stop_the_others() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let mut posts = HashMap::new();
    posts.insert(
        "technology".to_string(),
        vec![post("t1", "technology", "Meta stock surge incoming", "")],
    );
    posts.insert(
        "stocks".to_string(),
        vec![
            post("s1", "stocks", "META surge continues", "Calls printing"),
            post("s2", "stocks", "Unrelated index chatter", "SPY flat"),
        ],
    );
    let forum = Arc::new(MockForumService::with_posts(posts).failing_community("technology"));
    let service = service(classifier, MockNewsService::with_items(Vec::new()), forum.clone());

    let report = service.analyze(&request(&["META"])).await.unwrap();
    let meta = &report.tickers[0];

    assert_eq!(forum.searched_communities(), vec!["technology", "stocks"]);
    assert_eq!(meta.forum.warnings.len(), 1);
    assert!(meta.forum.warnings[0].contains("r/technology"));
    assert_eq!(meta.forum.fetched, 2);
    assert_eq!(meta.forum.matched, 1);
    assert_eq!(meta.forum.result.positive_count, 1);
    assert!((meta.forum.result.final_score - 0.9).abs() < 1e-9);
    assert_eq!(meta.forum.result.verdict, Verdict::Positive);
}

#[tokio::test]
async fn test_classification_failure_skips_item() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let news_items = vec![
        news("1", "Tesla probe widens", "Tesla probe widens to autopilot"),
        news("2", "Tesla garbled", "tesla garbled feed text"),
        news("3", "Tesla probe two", "Second tesla probe announced"),
    ];
    let forum = Arc::new(MockForumService::with_posts(HashMap::new()));
    let service = service(classifier.clone(), MockNewsService::with_items(news_items), forum);

    let report = service.analyze(&request(&["TSLA"])).await.unwrap();
    let tsla = &report.tickers[0].news;

    assert_eq!(classifier.calls(), 3);
    assert_eq!(tsla.classification_failures, 1);
    assert_eq!(tsla.result.items.len(), 2);
    assert_eq!(tsla.result.negative_count, 2);
    assert!((tsla.result.final_score + 0.7).abs() < 1e-9);
    assert_eq!(tsla.result.verdict, Verdict::Negative);
    assert!(tsla.warnings.iter().any(|w| w.contains("Tesla garbled")));
}

#[tokio::test]
async fn test_empty_ticker_list_fetches_nothing() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let forum = Arc::new(MockForumService::new());
    let service = service(classifier.clone(), MockNewsService::new(), forum.clone());

    let result = service.analyze(&request(&[])).await;

    assert!(matches!(result, Err(AnalysisError::NoTickers)));
    assert_eq!(classifier.calls(), 0);
    assert!(forum.searched_communities().is_empty());
}

#[tokio::test]
async fn test_invalid_limits_are_rejected() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let service = service(classifier, MockNewsService::new(), Arc::new(MockForumService::new()));

    let mut bad = request(&["META"]);
    bad.limits.news_items = 51;
    assert!(matches!(
        service.analyze(&bad).await,
        Err(AnalysisError::InvalidLimit { .. })
    ));
}

#[tokio::test]
async fn test_unavailable_news_feed_still_reports_forum() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let forum = Arc::new(MockForumService::new());
    let service = service(classifier, MockNewsService::failing("connection refused"), forum);

    let report = service.analyze(&request(&["AAPL"])).await.unwrap();
    let aapl = &report.tickers[0];

    assert_eq!(aapl.news.warnings.len(), 1);
    assert!(aapl.news.warnings[0].contains("connection refused"));
    assert_eq!(aapl.news.result.final_score, 0.0);
    assert_eq!(aapl.news.result.verdict, Verdict::Neutral);
    // Two matching generated posts in each of r/apple and r/stocks.
    assert_eq!(aapl.forum.matched, 4);
    assert_eq!(aapl.forum.result.neutral_count, 4);
    assert!(aapl.forum.warnings.is_empty());
}

#[tokio::test]
async fn test_news_limit_counts_relevant_items_in_feed_order() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let news_items: Vec<CandidateItem> = (0..10)
        .map(|i| news(&i.to_string(), &format!("Apple headline {i}"), "Apple update"))
        .collect();
    let service = service(
        classifier,
        MockNewsService::with_items(news_items),
        Arc::new(MockForumService::with_posts(HashMap::new())),
    );

    let mut req = request(&["AAPL"]);
    req.limits.news_items = 3;
    let report = service.analyze(&req).await.unwrap();

    let titles: Vec<&str> = report.tickers[0]
        .news
        .result
        .items
        .iter()
        .map(|c| c.item.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Apple headline 0", "Apple headline 1", "Apple headline 2"]);
}

#[tokio::test]
async fn test_community_overrides_and_fallbacks() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let forum = Arc::new(MockForumService::new());
    let service = service(classifier, MockNewsService::new(), forum.clone());

    let req = request(&["AAPL", "NVDA"]).with_communities("aapl", vec!["investing".to_string()]);
    let report = service.analyze(&req).await.unwrap();

    // AAPL uses the override, NVDA is not in the watchlist and searches its own name.
    assert_eq!(forum.searched_communities(), vec!["investing", "NVDA"]);
    assert_eq!(report.tickers[0].profile.communities, vec!["investing"]);
    assert_eq!(report.tickers[1].profile.keyword, "nvda");
}

#[tokio::test]
async fn test_tickers_are_reported_in_request_order() {
    let classifier = Arc::new(ScriptedClassifier::new());
    let service = service(classifier, MockNewsService::new(), Arc::new(MockForumService::new()));

    let mut seen = Vec::new();
    let report = service
        .analyze_with_progress(&request(&["TSLA", "META", "AAPL"]), |t| {
            seen.push(t.ticker().to_string())
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["TSLA", "META", "AAPL"]);
    let order: Vec<&str> = report.tickers.iter().map(|t| t.ticker()).collect();
    assert_eq!(order, vec!["TSLA", "META", "AAPL"]);
    assert!(report.finished_at >= report.started_at);
}
