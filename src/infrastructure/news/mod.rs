pub mod mock_news;
pub mod rss;

pub use mock_news::MockNewsService;
pub use rss::RssNewsService;
