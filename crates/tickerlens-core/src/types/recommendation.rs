//! Recommendation output types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::IndicatorKind;

/// Final recommended action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        };
        f.write_str(s)
    }
}

/// A single rule's vote. Abstention is represented by the absence of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    Buy,
    Sell,
    /// Risk dampener: cancels one BUY vote.
    Caution,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Caution => "CAUTION",
        };
        f.write_str(s)
    }
}

/// How complete the inputs to a recommendation were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Full,
    Degraded,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Degraded => f.write_str("degraded"),
        }
    }
}

/// A rule that voted, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule: String,
    pub vote: Vote,
}

/// Vote counts collected over one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub buy: u32,
    pub sell: u32,
    pub caution: u32,
}

impl VoteTally {
    pub fn record(&mut self, vote: Vote) {
        match vote {
            Vote::Buy => self.buy += 1,
            Vote::Sell => self.sell += 1,
            Vote::Caution => self.caution += 1,
        }
    }

    /// BUY votes left after each CAUTION cancels one.
    pub fn effective_buy(&self) -> u32 {
        self.buy.saturating_sub(self.caution)
    }

    /// Strict majority wins; ties hold.
    pub fn resolve(&self) -> Action {
        let buy = self.effective_buy();
        match buy.cmp(&self.sell) {
            std::cmp::Ordering::Greater => Action::Buy,
            std::cmp::Ordering::Less => Action::Sell,
            std::cmp::Ordering::Equal => Action::Hold,
        }
    }
}

/// Classification result for one indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub rationale: Vec<RuleHit>,
    pub confidence: Confidence,
    pub tally: VoteTally,
    /// Indicators the rule set needed but did not get.
    pub unavailable: Vec<IndicatorKind>,
}

impl Recommendation {
    /// Names of the rules that voted, in order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rationale.iter().map(|hit| hit.rule.as_str()).collect()
    }
}
