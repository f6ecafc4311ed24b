pub mod aggregation;
pub mod errors;
pub mod items;
pub mod ports;
pub mod relevance;
pub mod sentiment;
pub mod watchlist;
