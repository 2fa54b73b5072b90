pub mod backlog;
pub mod config;
pub mod error;
pub mod global;
pub mod http;
pub mod scraper;
pub mod sources;
