//! The rule table.

use tickerlens_core::{IndicatorKind, Vote};

use crate::RuleConfig;

/// Vote function. `values` holds the rule's required indicators in the
/// order of [`Rule::requires`]; it is only called when all are available.
pub type Evaluate = fn(values: &[f64], config: &RuleConfig) -> Option<Vote>;

/// One entry in the rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    pub requires: &'static [IndicatorKind],
    /// `RuleConfig` fields the rule reads
    pub parameters: &'static [&'static str],
    pub evaluate: Evaluate,
}

impl Rule {
    /// Evaluate against available values, or `None` to abstain.
    pub fn vote(&self, values: &[f64], config: &RuleConfig) -> Option<Vote> {
        (self.evaluate)(values, config)
    }
}

/// Built-in rules in priority order.
pub fn default_rules() -> Vec<Rule> {
    vec![MA_CROSS, MOMENTUM, TREND_AGREEMENT, VOLATILITY_CEILING]
}

pub const MA_CROSS: Rule = Rule {
    name: "ma_cross",
    description: "Golden/death cross: fast SMA above or below the slow SMA beyond a tolerance band",
    requires: &[IndicatorKind::SmaFast, IndicatorKind::SmaSlow],
    parameters: &["cross_tolerance"],
    evaluate: ma_cross,
};

pub const MOMENTUM: Rule = Rule {
    name: "momentum",
    description: "Rate of change over the momentum lag clears the minimum magnitude",
    requires: &[IndicatorKind::Momentum],
    parameters: &["min_momentum"],
    evaluate: momentum,
};

pub const TREND_AGREEMENT: Rule = Rule {
    name: "trend_agreement",
    description: "Six-month and one-month returns agree in direction",
    requires: &[IndicatorKind::Return6m, IndicatorKind::Return1m],
    parameters: &["trend_threshold"],
    evaluate: trend_agreement,
};

pub const VOLATILITY_CEILING: Rule = Rule {
    name: "volatility_ceiling",
    description: "Daily return volatility above the risk ceiling cancels one BUY vote",
    requires: &[IndicatorKind::Volatility],
    parameters: &["max_volatility"],
    evaluate: volatility_ceiling,
};

fn ma_cross(values: &[f64], config: &RuleConfig) -> Option<Vote> {
    let (fast, slow) = (values[0], values[1]);
    if fast > slow * (1.0 + config.cross_tolerance) {
        Some(Vote::Buy)
    } else if fast < slow * (1.0 - config.cross_tolerance) {
        Some(Vote::Sell)
    } else {
        None
    }
}

fn momentum(values: &[f64], config: &RuleConfig) -> Option<Vote> {
    let momentum = values[0];
    if momentum >= config.min_momentum && momentum > 0.0 {
        Some(Vote::Buy)
    } else if momentum <= -config.min_momentum && momentum < 0.0 {
        Some(Vote::Sell)
    } else {
        None
    }
}

fn trend_agreement(values: &[f64], config: &RuleConfig) -> Option<Vote> {
    let (long, short) = (values[0], values[1]);
    let threshold = config.trend_threshold;
    if long > threshold && short > threshold {
        Some(Vote::Buy)
    } else if long < -threshold && short < -threshold {
        Some(Vote::Sell)
    } else {
        None
    }
}

fn volatility_ceiling(values: &[f64], config: &RuleConfig) -> Option<Vote> {
    (values[0] > config.max_volatility).then_some(Vote::Caution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ma_cross_tolerance_band() {
        let config = RuleConfig::default();

        assert_eq!(MA_CROSS.vote(&[102.0, 100.0], &config), Some(Vote::Buy));
        assert_eq!(MA_CROSS.vote(&[98.0, 100.0], &config), Some(Vote::Sell));
        assert_eq!(MA_CROSS.vote(&[100.05, 100.0], &config), None);
        assert_eq!(MA_CROSS.vote(&[100.0, 100.0], &config), None);
    }

    #[test]
    fn test_momentum_magnitude() {
        let config = RuleConfig::default();

        assert_eq!(MOMENTUM.vote(&[0.05], &config), Some(Vote::Buy));
        assert_eq!(MOMENTUM.vote(&[-0.05], &config), Some(Vote::Sell));
        assert_eq!(MOMENTUM.vote(&[0.01], &config), None);
        assert_eq!(MOMENTUM.vote(&[0.0], &config), None);
    }

    #[test]
    fn test_momentum_zero_threshold_ignores_flat() {
        let config = RuleConfig {
            min_momentum: 0.0,
            ..Default::default()
        };
        assert_eq!(MOMENTUM.vote(&[0.0], &config), None);
        assert_eq!(MOMENTUM.vote(&[0.001], &config), Some(Vote::Buy));
    }

    #[test]
    fn test_trend_agreement_requires_both() {
        let config = RuleConfig::default();

        assert_eq!(TREND_AGREEMENT.vote(&[0.2, 0.03], &config), Some(Vote::Buy));
        assert_eq!(TREND_AGREEMENT.vote(&[-0.2, -0.03], &config), Some(Vote::Sell));
        assert_eq!(TREND_AGREEMENT.vote(&[0.2, -0.03], &config), None);
        assert_eq!(TREND_AGREEMENT.vote(&[0.0, 0.0], &config), None);
    }

    #[test]
    fn test_volatility_ceiling_only_cautions() {
        let config = RuleConfig::default();

        assert_eq!(VOLATILITY_CEILING.vote(&[0.05], &config), Some(Vote::Caution));
        assert_eq!(VOLATILITY_CEILING.vote(&[0.01], &config), None);
    }

    #[test]
    fn test_default_order() {
        let names: Vec<_> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["ma_cross", "momentum", "trend_agreement", "volatility_ceiling"]
        );
    }
}
