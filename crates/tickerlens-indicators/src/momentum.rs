//! Momentum indicators.

use tickerlens_core::traits::Indicator;

/// Rate of change over a fixed lag.
///
/// `(close[t] - close[t - lag]) / close[t - lag]`, as a fraction.
#[derive(Debug, Clone)]
pub struct Momentum {
    lag: usize,
}

impl Momentum {
    /// Create a momentum indicator comparing against `lag` quotes back.
    pub fn new(lag: usize) -> Self {
        assert!(lag > 0, "Lag must be greater than 0");
        Self { lag }
    }

    pub fn lag(&self) -> usize {
        self.lag
    }
}

impl Indicator for Momentum {
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.lag {
            return vec![];
        }

        data.iter()
            .skip(self.lag)
            .zip(data.iter())
            .map(|(&current, &past)| (current - past) / past)
            .collect()
    }

    /// The lag plus the current quote.
    fn period(&self) -> usize {
        self.lag + 1
    }

    fn name(&self) -> &str {
        "Momentum"
    }
}
