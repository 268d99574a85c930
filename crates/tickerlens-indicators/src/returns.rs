//! Trailing calendar-month returns.

use chrono::Months;
use tickerlens_core::{IndicatorError, PriceSeries};

/// Percentage change from the close roughly `months` calendar months ago.
///
/// The reference quote is the latest one dated at or before the target
/// date (`latest date - months`, clamped to the end of shorter months).
#[derive(Debug, Clone)]
pub struct TrailingReturn {
    months: u32,
}

impl TrailingReturn {
    pub fn new(months: u32) -> Self {
        assert!(months > 0, "Months must be greater than 0");
        Self { months }
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    /// Compute the return as of the latest quote, as a fraction.
    pub fn compute(&self, series: &PriceSeries) -> Result<f64, IndicatorError> {
        let latest = series.last().ok_or(IndicatorError::InsufficientData {
            required: 1,
            available: 0,
        })?;

        let target = latest
            .date
            .checked_sub_months(Months::new(self.months))
            .ok_or(IndicatorError::NoHistoryAt { target: latest.date })?;

        let reference = series
            .at_or_before(target)
            .ok_or(IndicatorError::NoHistoryAt { target })?;

        Ok((latest.close - reference.close) / reference.close)
    }
}
