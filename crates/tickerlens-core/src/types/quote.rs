//! Daily quote and price series types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateRange, Symbol};

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Shares traded
    pub volume: u64,
}

impl Quote {
    /// Create a new quote.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// All prices finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Validated, date-ordered daily history for one symbol.
///
/// Construction drops quotes with non-positive or non-finite prices, sorts
/// by date and collapses duplicate dates (the last one delivered wins), so
/// dates are always strictly ascending. Missing trading days stay missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: Symbol,
    source: String,
    quotes: Vec<Quote>,
}

impl PriceSeries {
    /// Build a series from provider output.
    pub fn new(
        symbol: Symbol,
        source: impl Into<String>,
        quotes: impl IntoIterator<Item = Quote>,
    ) -> Self {
        let mut valid: Vec<Quote> = quotes.into_iter().filter(Quote::is_valid).collect();
        // Stable sort keeps delivery order among equal dates.
        valid.sort_by_key(|q| q.date);

        let mut deduped: Vec<Quote> = Vec::with_capacity(valid.len());
        for quote in valid {
            match deduped.last_mut() {
                Some(last) if last.date == quote.date => *last = quote,
                _ => deduped.push(quote),
            }
        }

        Self {
            symbol,
            source: source.into(),
            quotes: deduped,
        }
    }

    /// Keep only the quotes inside `range`.
    pub fn within(mut self, range: &DateRange) -> Self {
        self.quotes.retain(|q| range.contains(q.date));
        self
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Identifier of the provider that served this series.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get all quotes, oldest first.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Get the number of quotes.
    #[inline]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Get the most recent quote.
    pub fn last(&self) -> Option<&Quote> {
        self.quotes.last()
    }

    /// Get the oldest quote.
    pub fn first(&self) -> Option<&Quote> {
        self.quotes.first()
    }

    /// Get the last N quotes (fewer if the series is shorter).
    pub fn last_n(&self, n: usize) -> &[Quote] {
        let start = self.quotes.len().saturating_sub(n);
        &self.quotes[start..]
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.quotes.iter().map(|q| q.close).collect()
    }

    /// Latest quote dated on or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&Quote> {
        let idx = self.quotes.partition_point(|q| q.date <= date);
        idx.checked_sub(1).map(|i| &self.quotes[i])
    }

    /// Get an iterator over the quotes.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter()
    }
}
