//! Thresholds used by the rule table.

use serde::{Deserialize, Serialize};
use tickerlens_core::traits::ValidateConfig;
use tickerlens_core::SettingsError;

/// Configuration for the recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Fractional band around sma_200 inside which no cross is called
    pub cross_tolerance: f64,
    /// Minimum absolute momentum (fraction) to vote
    pub min_momentum: f64,
    /// Both trailing returns must clear this (fraction) to vote
    pub trend_threshold: f64,
    /// Daily return volatility above which BUY votes are dampened
    pub max_volatility: f64,
    /// Missing required indicators at which confidence is degraded
    pub degraded_after_missing: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cross_tolerance: 0.001,  // 0.1%
            min_momentum: 0.02,      // 2%
            trend_threshold: 0.0,
            max_volatility: 0.03,    // 3% daily
            degraded_after_missing: 1,
        }
    }
}

impl ValidateConfig for RuleConfig {
    fn validate(&self) -> Result<(), SettingsError> {
        let thresholds = [
            ("cross_tolerance", self.cross_tolerance),
            ("min_momentum", self.min_momentum),
            ("trend_threshold", self.trend_threshold),
            ("max_volatility", self.max_volatility),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if self.degraded_after_missing == 0 {
            return Err(SettingsError::Invalid(
                "degraded_after_missing must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RuleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let negative = RuleConfig {
            min_momentum: -0.01,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = RuleConfig {
            max_volatility: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let never_degraded = RuleConfig {
            degraded_after_missing: 0,
            ..Default::default()
        };
        assert!(never_degraded.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: RuleConfig = toml::from_str("max_volatility = 0.05").unwrap();
        assert_eq!(config.max_volatility, 0.05);
        assert_eq!(config.min_momentum, 0.02);
    }
}
