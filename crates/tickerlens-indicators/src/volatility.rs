//! Volatility indicators.

use tickerlens_core::traits::Indicator;

/// Sample standard deviation of daily fractional returns.
///
/// A window of N closes yields N-1 returns; the deviation uses the n-1
/// (sample) denominator over those returns.
#[derive(Debug, Clone)]
pub struct ReturnVolatility {
    window: usize,
}

impl ReturnVolatility {
    /// Create a volatility indicator over `window` closes.
    pub fn new(window: usize) -> Self {
        assert!(window > 2, "Window must be greater than 2");
        Self { window }
    }

    fn sample_std_dev(returns: &[f64]) -> f64 {
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    }
}

impl Indicator for ReturnVolatility {
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.window {
            return vec![];
        }

        let returns: Vec<f64> = data.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

        returns
            .windows(self.window - 1)
            .map(Self::sample_std_dev)
            .collect()
    }

    fn period(&self) -> usize {
        self.window
    }

    fn name(&self) -> &str {
        "Volatility"
    }
}
