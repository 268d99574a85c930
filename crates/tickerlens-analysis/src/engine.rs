//! The analysis orchestrator.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use tickerlens_core::{AnalysisError, DateRange, Symbol};
use tickerlens_data::PriceSource;
use tickerlens_indicators::IndicatorEngine;
use tickerlens_rules::RecommendationEngine;

use crate::{AnalysisReport, CancelToken, RequestState, RequestTracker};

/// Calendar days of history requested when no range is given.
pub const DEFAULT_HISTORY_DAYS: u32 = 400;

/// Runs fetch, compute and recommend for each request.
///
/// Requests are independent; the only state they share is the series cache
/// inside the [`PriceSource`].
#[derive(Debug, Clone)]
pub struct Analyzer {
    source: PriceSource,
    indicators: IndicatorEngine,
    rules: RecommendationEngine,
    history_days: u32,
}

impl Analyzer {
    pub fn new(
        source: PriceSource,
        indicators: IndicatorEngine,
        rules: RecommendationEngine,
    ) -> Self {
        Self {
            source,
            indicators,
            rules,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    /// Set the trailing window used by [`analyze`](Self::analyze).
    ///
    /// Windows longer than [`DateRange::MAX_TRAILING_DAYS`] make
    /// [`default_range`](Self::default_range) fail.
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    pub fn source(&self) -> &PriceSource {
        &self.source
    }

    pub fn indicators(&self) -> &IndicatorEngine {
        &self.indicators
    }

    pub fn rules(&self) -> &RecommendationEngine {
        &self.rules
    }

    pub fn history_days(&self) -> u32 {
        self.history_days
    }

    /// Range ending today covering the configured history.
    pub fn default_range(&self) -> Result<DateRange, AnalysisError> {
        Ok(DateRange::ending_today(self.history_days)?)
    }

    /// Analyze `symbol` over the default trailing range.
    pub async fn analyze(&self, symbol: &str) -> Result<AnalysisReport, AnalysisError> {
        let range = self.default_range()?;
        self.analyze_with_range(symbol, &range).await
    }

    /// Analyze `symbol` over an explicit range.
    pub async fn analyze_with_range(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_cancellable(symbol, range, &CancelToken::new())
            .await
    }

    /// Analyze `symbol`, giving up as soon as `token` is cancelled.
    ///
    /// An in-flight provider call is dropped on cancellation and no report
    /// is produced.
    pub async fn analyze_cancellable(
        &self,
        symbol: &str,
        range: &DateRange,
        token: &CancelToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let mut tracker = RequestTracker::new(symbol.trim());
        self.run(&mut tracker, symbol, range, token).await
    }

    /// Analyze each symbol over the default range, at most `concurrency` at
    /// a time. Results are in input order.
    pub async fn analyze_many<S>(
        &self,
        symbols: &[S],
        concurrency: usize,
    ) -> Vec<Result<AnalysisReport, AnalysisError>>
    where
        S: AsRef<str>,
    {
        let range = match DateRange::ending_today(self.history_days) {
            Ok(range) => range,
            Err(e) => {
                warn!(history_days = self.history_days, "Invalid history window: {}", e);
                return symbols
                    .iter()
                    .map(|_| Err(AnalysisError::InvalidRange(e.clone())))
                    .collect();
            }
        };
        self.analyze_batch(symbols, &range, concurrency, &CancelToken::new())
            .await
    }

    /// Analyze each symbol over `range` with a shared cancellation token.
    pub async fn analyze_batch<S>(
        &self,
        symbols: &[S],
        range: &DateRange,
        concurrency: usize,
        token: &CancelToken,
    ) -> Vec<Result<AnalysisReport, AnalysisError>>
    where
        S: AsRef<str>,
    {
        stream::iter(symbols)
            .map(|symbol| self.analyze_cancellable(symbol.as_ref(), range, token))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    #[instrument(skip_all, fields(request_id = %tracker.id(), symbol = %raw_symbol.trim()))]
    async fn run(
        &self,
        tracker: &mut RequestTracker,
        raw_symbol: &str,
        range: &DateRange,
        token: &CancelToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let symbol = match Symbol::parse(raw_symbol) {
            Ok(symbol) => symbol,
            Err(error) => {
                warn!(%error, "Rejected symbol");
                return Err(error.into());
            }
        };

        if token.is_cancelled() {
            return Err(cancel(tracker));
        }
        step(tracker, RequestState::Fetching);

        let outcome = {
            let fetch = self.source.fetch_symbol(&symbol, range, |position, provider| {
                if position > 0 {
                    warn!(provider, position, "Falling back to next provider");
                    step(tracker, RequestState::FallbackFetching);
                }
            });

            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = fetch => Some(result),
            }
        };

        let fetched = match outcome {
            None => return Err(cancel(tracker)),
            Some(Ok(fetched)) => fetched,
            Some(Err(error)) => {
                step(tracker, RequestState::Failed);
                warn!(%error, reason = error.reason(), "Analysis failed");
                return Err(error);
            }
        };

        let Some(last) = fetched.series.last().copied() else {
            step(tracker, RequestState::Failed);
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
                failures: Vec::new(),
            });
        };

        if token.is_cancelled() {
            return Err(cancel(tracker));
        }
        step(tracker, RequestState::Computing);
        let indicators = self.indicators.compute(&fetched.series);

        if token.is_cancelled() {
            return Err(cancel(tracker));
        }
        step(tracker, RequestState::Recommending);
        let recommendation = self.rules.classify(&indicators);

        if token.is_cancelled() {
            return Err(cancel(tracker));
        }

        let report = AnalysisReport {
            request_id: tracker.id(),
            symbol: symbol.to_string(),
            source: fetched.series.source().to_string(),
            source_chain: fetched.source_chain,
            from_cache: fetched.from_cache,
            generated_at: Utc::now(),
            range: *range,
            as_of: last.date,
            last_close: last.close,
            quote_count: fetched.series.len(),
            indicators,
            recommendation,
            company: fetched.company,
        };
        step(tracker, RequestState::Done);

        info!(
            action = %report.recommendation.action,
            confidence = %report.recommendation.confidence,
            source = %report.source,
            "Analysis complete"
        );

        Ok(report)
    }
}

/// Advance the tracker; rejected transitions are logged by the tracker.
fn step(tracker: &mut RequestTracker, next: RequestState) {
    let _ = tracker.advance(next);
}

fn cancel(tracker: &mut RequestTracker) -> AnalysisError {
    step(tracker, RequestState::Cancelled);
    info!(request_id = %tracker.id(), "Analysis cancelled");
    AnalysisError::Cancelled
}
