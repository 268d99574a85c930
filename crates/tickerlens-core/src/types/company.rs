//! Descriptive company data.

use serde::{Deserialize, Serialize};

/// Company overview reported alongside a price series.
///
/// Purely informational. Every field except the name is optional because
/// providers fill in different subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    /// Fraction, e.g. `0.0044` for 0.44%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

impl CompanyProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exchange: None,
            sector: None,
            industry: None,
            market_cap: None,
            pe_ratio: None,
            dividend_yield: None,
        }
    }
}
