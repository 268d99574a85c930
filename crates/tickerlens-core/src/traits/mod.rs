//! Core traits for the analysis pipeline.

mod config;
mod indicator;
mod quote_fetcher;

pub use config::ValidateConfig;
pub use indicator::Indicator;
pub use quote_fetcher::QuoteFetcher;
