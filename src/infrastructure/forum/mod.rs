pub mod mock_forum;
pub mod reddit;

pub use mock_forum::MockForumService;
pub use reddit::{RedditCredentials, RedditSearchService};
