pub mod classifier;
pub mod core;
pub mod factory;
pub mod forum;
pub mod news;

pub use factory::ServiceFactory;
