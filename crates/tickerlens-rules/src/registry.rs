//! Rule registry for listing and describing the rule table.

use serde::{Deserialize, Serialize};
use tickerlens_core::IndicatorKind;

use crate::{default_rules, Rule, RuleConfig};

/// Information about a registered rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Rule name as it appears in a rationale
    pub name: String,
    /// Rule description
    pub description: String,
    /// Indicators the rule needs to vote
    pub requires: Vec<IndicatorKind>,
    /// Thresholds in effect, keyed by `RuleConfig` field
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Registry of the rules in evaluation order.
pub struct RuleRegistry {
    rules: Vec<RuleInfo>,
}

impl RuleRegistry {
    /// Describe the built-in rule table with the given thresholds.
    pub fn new(config: &RuleConfig) -> Self {
        Self::from_rules(&default_rules(), config)
    }

    /// Describe an arbitrary rule table.
    pub fn from_rules(rules: &[Rule], config: &RuleConfig) -> Self {
        let settings = match serde_json::to_value(config) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        let rules = rules
            .iter()
            .map(|rule| RuleInfo {
                name: rule.name.to_string(),
                description: rule.description.to_string(),
                requires: rule.requires.to_vec(),
                parameters: rule
                    .parameters
                    .iter()
                    .filter_map(|key| {
                        settings
                            .get(*key)
                            .map(|value| ((*key).to_string(), value.clone()))
                    })
                    .collect(),
            })
            .collect();

        Self { rules }
    }

    /// List all rules in evaluation order.
    pub fn list(&self) -> &[RuleInfo] {
        &self.rules
    }

    /// Get rule info by name.
    pub fn get(&self, name: &str) -> Option<&RuleInfo> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Check if a rule exists.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get all rule names.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name.as_str()).collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}
