//! Rule evaluation and vote resolution.

use tracing::debug;

use tickerlens_core::traits::ValidateConfig;
use tickerlens_core::{
    Confidence, IndicatorKind, IndicatorSet, Recommendation, RuleHit, SettingsError, VoteTally,
};

use crate::{default_rules, Rule, RuleConfig};

/// Pure classifier from an [`IndicatorSet`] to a [`Recommendation`].
///
/// Rules run in table order. A rule whose required indicators are not all
/// available abstains without being evaluated. CAUTION votes each cancel
/// one BUY vote, then a strict majority of BUY or SELL wins and anything
/// else is HOLD.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: RuleConfig,
    rules: Vec<Rule>,
    required: Vec<IndicatorKind>,
}

impl RecommendationEngine {
    /// Create an engine over the built-in rule table.
    pub fn new(config: RuleConfig) -> Result<Self, SettingsError> {
        Self::with_rules(config, default_rules())
    }

    /// Create an engine over a custom rule table.
    pub fn with_rules(config: RuleConfig, rules: Vec<Rule>) -> Result<Self, SettingsError> {
        config.validate()?;
        Ok(Self {
            required: required_by(&rules),
            config,
            rules,
        })
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Indicators any rule depends on, in first-use order.
    pub fn required_indicators(&self) -> &[IndicatorKind] {
        &self.required
    }

    /// Classify an indicator set.
    pub fn classify(&self, indicators: &IndicatorSet) -> Recommendation {
        let mut tally = VoteTally::default();
        let mut rationale = Vec::new();

        for rule in &self.rules {
            let values: Option<Vec<f64>> = rule
                .requires
                .iter()
                .map(|kind| indicators.get(*kind).value())
                .collect();

            let Some(values) = values else {
                debug!(rule = rule.name, "Rule abstained: indicator unavailable");
                continue;
            };

            if let Some(vote) = rule.vote(&values, &self.config) {
                tally.record(vote);
                rationale.push(RuleHit {
                    rule: rule.name.to_string(),
                    vote,
                });
            }
        }

        let unavailable: Vec<IndicatorKind> = self
            .required
            .iter()
            .copied()
            .filter(|kind| !indicators.get(*kind).is_available())
            .collect();

        let confidence = if unavailable.len() >= self.config.degraded_after_missing {
            Confidence::Degraded
        } else {
            Confidence::Full
        };

        Recommendation {
            action: tally.resolve(),
            rationale,
            confidence,
            tally,
            unavailable,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        let rules = default_rules();
        Self {
            required: required_by(&rules),
            config: RuleConfig::default(),
            rules,
        }
    }
}

fn required_by(rules: &[Rule]) -> Vec<IndicatorKind> {
    let mut required: Vec<IndicatorKind> = Vec::new();
    for kind in rules.iter().flat_map(|rule| rule.requires.iter().copied()) {
        if !required.contains(&kind) {
            required.push(kind);
        }
    }
    required
}
