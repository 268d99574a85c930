//! Quote providers and the failover price source.
//!
//! [`PriceSource`] walks an ordered list of [`QuoteFetcher`] providers,
//! retrying transient failures with backoff and falling over to the next
//! provider when one is exhausted. A shared [`SeriesCache`] can
//! short-circuit repeated requests.
//!
//! [`QuoteFetcher`]: tickerlens_core::QuoteFetcher

mod cache;
pub mod providers;
mod retry;
mod source;

pub use cache::{CacheStats, CachedSeries, SeriesCache};
pub use providers::{AlphaVantageProvider, CsvProvider, YahooProvider};
pub use retry::{Backoff, FetchPolicy, RetryConfig};
pub use source::{Fetched, PriceSource};
