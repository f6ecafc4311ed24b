use finpulse::application::analysis_service::{AnalysisLimits, AnalysisRequest, AnalysisService};
use finpulse::application::reporting::{SentimentReporter, item_rows, write_items_csv};
use finpulse::domain::items::{CandidateItem, SourceKind};
use finpulse::domain::watchlist::Watchlist;
use finpulse::infrastructure::classifier::LexiconClassifier;
use finpulse::infrastructure::forum::MockForumService;
use finpulse::infrastructure::news::MockNewsService;
use std::collections::HashMap;
use std::sync::Arc;

fn offline_service(news: MockNewsService, forum: MockForumService) -> AnalysisService {
    AnalysisService::new(
        Arc::new(LexiconClassifier::default()),
        Arc::new(news),
        Arc::new(forum),
        Watchlist::builtin(),
    )
}

#[test]
fn test_report_for_empty_sources() {
    let service = offline_service(
        MockNewsService::with_items(Vec::new()),
        MockForumService::with_posts(HashMap::new()),
    );
    let request = AnalysisRequest::new(vec!["META".to_string()], AnalysisLimits::default());
    let report = tokio_test::block_on(service.analyze(&request)).unwrap();

    let text = SentimentReporter::new(false).render(&report);
    assert!(text.contains("Yahoo Finance: No matching articles found for sentiment analysis."));
    assert!(text.contains("Reddit: No matching posts found for sentiment analysis."));
    assert!(item_rows(&report).is_empty());
}

#[test]
fn test_report_lists_classified_items() {
    let items = vec![
        CandidateItem::new(
            "1",
            SourceKind::News,
            "Apple stock soars to record high",
            "Apple delivered excellent growth and strong profit, shares soar",
        )
        .with_link("https://finance.yahoo.com/news/apple-record"),
        CandidateItem::new(
            "2",
            SourceKind::News,
            "Apple hit by lawsuit",
            "Apple shares plunge after a terrible loss and a fraud lawsuit",
        ),
    ];
    let service = offline_service(
        MockNewsService::with_items(items),
        MockForumService::with_posts(HashMap::new()),
    );
    let request = AnalysisRequest::new(vec!["AAPL".to_string()], AnalysisLimits::default());
    let report = tokio_test::block_on(service.analyze(&request)).unwrap();

    let news = &report.tickers[0].news.result;
    assert_eq!(news.positive_count, 1);
    assert_eq!(news.negative_count, 1);

    let text = SentimentReporter::new(true).render(&report);
    assert!(text.contains("===== AAPL ====="));
    assert!(text.contains("Title: Apple stock soars to record high"));
    assert!(text.contains("Yahoo Finance Sentiment:"));
    assert!(text.contains("Total Positive Articles: 1"));
    assert!(text.contains("Total Negative Articles: 1"));

    let mut csv = Vec::new();
    assert_eq!(write_items_csv(&report, &mut csv).unwrap(), 2);
    let csv = String::from_utf8(csv).unwrap();
    assert!(csv.contains("AAPL,Yahoo Finance,Apple stock soars to record high,https://finance.yahoo.com/news/apple-record,positive"));
}
