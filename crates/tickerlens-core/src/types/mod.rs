//! Core data types for the analysis pipeline.

mod company;
mod indicators;
mod quote;
mod range;
mod recommendation;
mod symbol;

pub use company::CompanyProfile;
pub use indicators::{IndicatorKind, IndicatorSet, IndicatorValue};
pub use quote::{PriceSeries, Quote};
pub use range::DateRange;
pub use recommendation::{Action, Confidence, Recommendation, RuleHit, Vote, VoteTally};
pub use symbol::Symbol;
