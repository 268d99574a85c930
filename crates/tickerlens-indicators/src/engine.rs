//! Computes the full indicator set for one price series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tickerlens_core::traits::{Indicator, ValidateConfig};
use tickerlens_core::{
    IndicatorError, IndicatorKind, IndicatorSet, IndicatorValue, PriceSeries, SettingsError,
};

use crate::{Momentum, ReturnVolatility, Sma, TrailingReturn};

/// Window lengths for the indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Quotes in the fast moving average (reported as `sma_50`)
    pub fast_window: usize,
    /// Quotes in the slow moving average (reported as `sma_200`)
    pub slow_window: usize,
    /// Quotes back for momentum
    pub momentum_lag: usize,
    /// Quotes in the volatility window
    pub volatility_window: usize,
    /// Calendar months for `return_6m`
    pub long_return_months: u32,
    /// Calendar months for `return_1m`
    pub short_return_months: u32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
            momentum_lag: 20,
            volatility_window: 21,
            long_return_months: 6,
            short_return_months: 1,
        }
    }
}

impl ValidateConfig for IndicatorConfig {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.fast_window == 0 || self.momentum_lag == 0 {
            return Err(SettingsError::Invalid(
                "Indicator windows must be greater than 0".into(),
            ));
        }
        if self.fast_window >= self.slow_window {
            return Err(SettingsError::Invalid(
                "Fast window must be less than slow window".into(),
            ));
        }
        if self.volatility_window < 3 {
            return Err(SettingsError::Invalid(
                "Volatility window must be at least 3 quotes".into(),
            ));
        }
        if self.long_return_months == 0 || self.short_return_months == 0 {
            return Err(SettingsError::Invalid(
                "Return periods must be at least 1 month".into(),
            ));
        }
        Ok(())
    }
}

/// Derives an [`IndicatorSet`] from a [`PriceSeries`].
///
/// Never fails: an indicator whose data requirement is not met is reported
/// as [`IndicatorValue::Unavailable`]. Output depends only on the series,
/// so computing twice yields identical sets.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
    fast: Sma,
    slow: Sma,
    momentum: Momentum,
    volatility: ReturnVolatility,
    long_return: TrailingReturn,
    short_return: TrailingReturn,
}

impl IndicatorEngine {
    /// Build an engine after validating the window settings.
    pub fn new(config: IndicatorConfig) -> Result<Self, SettingsError> {
        config.validate()?;
        Ok(Self {
            fast: Sma::new(config.fast_window),
            slow: Sma::new(config.slow_window),
            momentum: Momentum::new(config.momentum_lag),
            volatility: ReturnVolatility::new(config.volatility_window),
            long_return: TrailingReturn::new(config.long_return_months),
            short_return: TrailingReturn::new(config.short_return_months),
            config,
        })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute every indicator as of the latest quote.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSet {
        let closes = series.closes();

        let set = IndicatorSet {
            sma_50: settle(IndicatorKind::SmaFast, self.fast.latest(&closes)),
            sma_200: settle(IndicatorKind::SmaSlow, self.slow.latest(&closes)),
            momentum: settle(IndicatorKind::Momentum, self.momentum.latest(&closes)),
            volatility: settle(IndicatorKind::Volatility, self.volatility.latest(&closes)),
            return_6m: settle(IndicatorKind::Return6m, self.long_return.compute(series)),
            return_1m: settle(IndicatorKind::Return1m, self.short_return.compute(series)),
        };

        debug!(
            symbol = %series.symbol(),
            quotes = series.len(),
            unavailable = set.unavailable().len(),
            "Computed indicators"
        );

        set
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        let config = IndicatorConfig::default();
        Self {
            fast: Sma::new(config.fast_window),
            slow: Sma::new(config.slow_window),
            momentum: Momentum::new(config.momentum_lag),
            volatility: ReturnVolatility::new(config.volatility_window),
            long_return: TrailingReturn::new(config.long_return_months),
            short_return: TrailingReturn::new(config.short_return_months),
            config,
        }
    }
}

fn settle(kind: IndicatorKind, result: Result<f64, IndicatorError>) -> IndicatorValue {
    match result {
        Ok(value) => IndicatorValue::from_f64(value),
        Err(error) => {
            debug!(indicator = %kind, %error, "Indicator unavailable");
            IndicatorValue::Unavailable
        }
    }
}
