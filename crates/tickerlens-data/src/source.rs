//! Failover price source.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tickerlens_core::{
    AnalysisError, CompanyProfile, DateRange, FetchError, PriceSeries, ProviderFailure,
    QuoteFetcher, Symbol,
};

use crate::{CachedSeries, FetchPolicy, SeriesCache};

/// A successfully fetched series and how it was obtained.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub series: PriceSeries,
    /// Providers tried, in order; the last one served the series.
    /// Empty when the series came from the cache.
    pub source_chain: Vec<String>,
    pub from_cache: bool,
    /// Company overview from the provider that served the series, if it
    /// had one.
    pub company: Option<CompanyProfile>,
}

/// Ordered providers with retry, timeout and failover.
///
/// Providers are tried in order. Transient failures are retried on the same
/// provider with backoff up to the retry cap; after that, or after any
/// non-transient failure, the next provider is tried. Only when every
/// provider has failed does the fetch fail with
/// [`AnalysisError::DataUnavailable`].
#[derive(Clone)]
pub struct PriceSource {
    providers: Vec<Arc<dyn QuoteFetcher>>,
    policy: FetchPolicy,
    cache: Option<SeriesCache>,
    profiles: bool,
}

impl PriceSource {
    /// Create a source over `providers` in priority order.
    pub fn new(providers: Vec<Arc<dyn QuoteFetcher>>, policy: FetchPolicy) -> Self {
        Self {
            providers,
            policy,
            cache: None,
            profiles: true,
        }
    }

    /// Enable or disable the company profile lookup after each fetch.
    pub fn with_company_profiles(mut self, enabled: bool) -> Self {
        self.profiles = enabled;
        self
    }

    /// Attach a shared series cache.
    pub fn with_cache(mut self, cache: SeriesCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn cache(&self) -> Option<&SeriesCache> {
        self.cache.as_ref()
    }

    pub fn company_profiles(&self) -> bool {
        self.profiles
    }

    /// Parse `symbol` and fetch its history.
    pub async fn fetch(&self, symbol: &str, range: &DateRange) -> Result<Fetched, AnalysisError> {
        let symbol = Symbol::parse(symbol)?;
        self.fetch_symbol(&symbol, range, |_, _| {}).await
    }

    /// Fetch history for an already validated symbol.
    ///
    /// `on_attempt` is called with the position and id of each provider
    /// right before it is first tried.
    pub async fn fetch_symbol<F>(
        &self,
        symbol: &Symbol,
        range: &DateRange,
        mut on_attempt: F,
    ) -> Result<Fetched, AnalysisError>
    where
        F: FnMut(usize, &str),
    {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(symbol, range).await {
                debug!(%symbol, %range, source = cached.series.source(), "Cache hit");
                return Ok(Fetched {
                    series: cached.series,
                    source_chain: Vec::new(),
                    from_cache: true,
                    company: cached.company,
                });
            }
        }

        let mut source_chain = Vec::with_capacity(self.providers.len());
        let mut failures = Vec::new();

        for (position, provider) in self.providers.iter().enumerate() {
            on_attempt(position, provider.id());
            source_chain.push(provider.id().to_string());

            match self.try_provider(provider.as_ref(), symbol, range).await {
                Ok(series) => {
                    info!(
                        %symbol,
                        provider = provider.id(),
                        quotes = series.len(),
                        "Fetched price history"
                    );
                    let company = if self.profiles {
                        self.company(provider.as_ref(), symbol).await
                    } else {
                        None
                    };
                    if let Some(cache) = &self.cache {
                        let cached = CachedSeries {
                            series: series.clone(),
                            company: company.clone(),
                        };
                        cache.put(symbol, range, cached).await;
                    }
                    return Ok(Fetched {
                        series,
                        source_chain,
                        from_cache: false,
                        company,
                    });
                }
                Err(failure) => {
                    warn!(
                        %symbol,
                        provider = %failure.provider,
                        attempts = failure.attempts,
                        error = %failure.error,
                        "Provider failed"
                    );
                    failures.push(failure);
                }
            }
        }

        Err(AnalysisError::DataUnavailable {
            symbol: symbol.to_string(),
            failures,
        })
    }

    /// Call one provider until it succeeds, fails permanently or runs out
    /// of retries.
    async fn try_provider(
        &self,
        provider: &dyn QuoteFetcher,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<PriceSeries, ProviderFailure> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let error = match self.call(provider, symbol, range).await {
                Ok(series) => return Ok(series),
                Err(error) => error,
            };

            let retry = attempts - 1;
            if !error.is_transient() || retry >= self.policy.retry.max_retries {
                return Err(ProviderFailure {
                    provider: provider.id().to_string(),
                    error,
                    attempts,
                });
            }

            let delay = self.policy.retry.delay_for_attempt(retry);
            debug!(
                provider = provider.id(),
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                %error,
                "Retrying provider"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One timed provider call, validated into a series.
    async fn call(
        &self,
        provider: &dyn QuoteFetcher,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<PriceSeries, FetchError> {
        let quotes = tokio::time::timeout(self.policy.timeout, provider.fetch_quotes(symbol, range))
            .await
            .map_err(|_| FetchError::Timeout(self.policy.timeout))??;

        let series = PriceSeries::new(symbol.clone(), provider.id(), quotes).within(range);
        if series.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(series)
    }

    /// Best-effort company lookup on the provider that served the series.
    /// Failures are logged and dropped; they never fail the fetch.
    async fn company(&self, provider: &dyn QuoteFetcher, symbol: &Symbol) -> Option<CompanyProfile> {
        match tokio::time::timeout(self.policy.timeout, provider.company_profile(symbol)).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(error)) => {
                debug!(%symbol, provider = provider.id(), %error, "Company profile unavailable");
                None
            }
            Err(_) => {
                debug!(%symbol, provider = provider.id(), "Company profile lookup timed out");
                None
            }
        }
    }
}

impl std::fmt::Debug for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceSource")
            .field("providers", &self.provider_ids())
            .field("policy", &self.policy)
            .field("cached", &self.cache.is_some())
            .field("profiles", &self.profiles)
            .finish()
    }
}
