//! Quote provider trait definitions.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{CompanyProfile, DateRange, Quote, Symbol};

/// A source of daily price history.
///
/// Implementations make exactly one upstream call per invocation; retries,
/// timeouts and failover are layered on top by the caller.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Stable identifier reported as the series source (e.g. `yahoo`).
    fn id(&self) -> &str;

    /// Fetch daily quotes for `symbol`.
    ///
    /// # Arguments
    /// * `symbol` - A validated ticker
    /// * `range` - Inclusive calendar range requested
    ///
    /// # Returns
    /// Raw quotes in any order; the caller validates, sorts and trims them
    /// to `range`.
    async fn fetch_quotes(&self, symbol: &Symbol, range: &DateRange)
        -> Result<Vec<Quote>, FetchError>;

    /// Look up descriptive company data for `symbol`.
    ///
    /// Best effort: `Ok(None)` when the provider has no such data.
    async fn company_profile(&self, _symbol: &Symbol) -> Result<Option<CompanyProfile>, FetchError> {
        Ok(None)
    }
}
