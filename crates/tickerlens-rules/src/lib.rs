//! Rule-based BUY/HOLD/SELL classification.
//!
//! Rules are plain data: a name, the indicators they need and a vote
//! function. [`RecommendationEngine`] walks them in priority order and
//! resolves the votes into a single [`Action`](tickerlens_core::Action).

pub mod config;
pub mod engine;
pub mod registry;
pub mod rules;

pub use config::RuleConfig;
pub use engine::RecommendationEngine;
pub use registry::{RuleInfo, RuleRegistry};
pub use rules::{default_rules, Rule};
