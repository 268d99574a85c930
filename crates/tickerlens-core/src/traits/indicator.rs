//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for technical indicators over a close-price slice.
///
/// `calculate` produces one value per complete trailing window, oldest
/// first, so the last element is the value as of the latest close.
pub trait Indicator: Send + Sync {
    /// Calculate indicator values for the given closes.
    fn calculate(&self, data: &[f64]) -> Vec<f64>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }

    /// Value as of the most recent close.
    ///
    /// Only the trailing `period()` closes are fed to `calculate`.
    fn latest(&self, data: &[f64]) -> Result<f64, IndicatorError> {
        self.validate_data(data)?;
        let window = &data[data.len() - self.period()..];
        self.calculate(window)
            .last()
            .copied()
            .ok_or(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestIndicator {
        period: usize,
    }

    impl Indicator for TestIndicator {
        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            if data.len() < self.period {
                return vec![];
            }
            // Window sums
            data.windows(self.period).map(|w| w.iter().sum()).collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_indicator_validation() {
        let indicator = TestIndicator { period: 5 };

        assert!(indicator.validate_data(&[1.0, 2.0, 3.0]).is_err());
        assert!(indicator.validate_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
    }

    #[test]
    fn test_latest_uses_trailing_window() {
        let indicator = TestIndicator { period: 3 };
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];

        assert!((indicator.latest(&data).unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(
            indicator.latest(&data[..2]),
            Err(IndicatorError::InsufficientData {
                required: 3,
                available: 2
            })
        );
    }
}
