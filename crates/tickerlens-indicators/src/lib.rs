//! Technical indicators for daily price series.
//!
//! This crate provides the fixed indicator set reported by every analysis:
//! - Simple moving averages over a fast and a slow window
//! - Momentum over a fixed lag
//! - Volatility of daily returns
//! - Trailing calendar-month returns
//!
//! [`IndicatorEngine`] computes all of them from one [`PriceSeries`] and
//! marks any it cannot compute as unavailable instead of failing.
//!
//! [`PriceSeries`]: tickerlens_core::PriceSeries

pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod returns;
pub mod volatility;

pub use engine::{IndicatorConfig, IndicatorEngine};
pub use momentum::Momentum;
pub use moving_average::Sma;
pub use returns::TrailingReturn;
pub use volatility::ReturnVolatility;
