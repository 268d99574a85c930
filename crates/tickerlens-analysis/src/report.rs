//! Analysis reports.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tickerlens_core::{CompanyProfile, DateRange, IndicatorSet, Recommendation};

/// Terminal artifact of one successful analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub symbol: String,
    /// Provider that served the price history
    pub source: String,
    /// Providers tried for this request, in order (empty on a cache hit)
    pub source_chain: Vec<String>,
    pub from_cache: bool,
    pub generated_at: DateTime<Utc>,
    pub range: DateRange,
    /// Date of the latest quote
    pub as_of: NaiveDate,
    pub last_close: f64,
    pub quote_count: usize,
    pub indicators: IndicatorSet,
    pub recommendation: Recommendation,
    /// Company overview, when the serving provider had one
    #[serde(default)]
    pub company: Option<CompanyProfile>,
}

impl AnalysisReport {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "                 ANALYSIS REPORT: {:<10}               \n",
            self.symbol
        ));
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        if let Some(company) = &self.company {
            s.push_str("COMPANY\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            s.push_str(&format!("  Company:             {}\n", company.name));
            let details = [
                ("Sector:", company.sector.as_deref()),
                ("Industry:", company.industry.as_deref()),
                ("Exchange:", company.exchange.as_deref()),
            ];
            for (label, value) in details {
                if let Some(value) = value {
                    s.push_str(&format!("  {:<20} {}\n", label, value));
                }
            }
            if let Some(cap) = company.market_cap {
                s.push_str(&format!("  Market Cap:          {:.2}B\n", cap / 1e9));
            }
            if let Some(pe) = company.pe_ratio {
                s.push_str(&format!("  P/E:                 {:.2}\n", pe));
            }
            if let Some(dividend) = company.dividend_yield {
                s.push_str(&format!("  Dividend Yield:      {:.2}%\n", dividend * 100.0));
            }
            s.push('\n');
        }

        s.push_str("RECOMMENDATION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Action:              {}\n",
            self.recommendation.action
        ));
        s.push_str(&format!(
            "  Confidence:          {}\n",
            self.recommendation.confidence
        ));
        if self.recommendation.rationale.is_empty() {
            s.push_str("  Rationale:           (no rule voted)\n");
        } else {
            s.push_str("  Rationale:\n");
            for hit in &self.recommendation.rationale {
                s.push_str(&format!("    - {:<20} {}\n", hit.rule, hit.vote));
            }
        }
        if !self.recommendation.unavailable.is_empty() {
            let missing: Vec<&str> = self
                .recommendation
                .unavailable
                .iter()
                .map(|kind| kind.as_str())
                .collect();
            s.push_str(&format!("  Unavailable:         {}\n", missing.join(", ")));
        }
        s.push('\n');

        s.push_str("INDICATORS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        for (kind, value) in self.indicators.iter() {
            s.push_str(&format!("  {:<20} {}\n", format!("{kind}:"), value));
        }
        s.push('\n');

        s.push_str("DATA\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        let cached = if self.from_cache { " (cached)" } else { "" };
        s.push_str(&format!("  Source:              {}{}\n", self.source, cached));
        if self.source_chain.len() > 1 {
            s.push_str(&format!(
                "  Tried:               {}\n",
                self.source_chain.join(" -> ")
            ));
        }
        s.push_str(&format!("  Range:               {}\n", self.range));
        s.push_str(&format!("  Quotes:              {}\n", self.quote_count));
        s.push_str(&format!(
            "  Last Close:          {:.2} ({})\n",
            self.last_close, self.as_of
        ));
        s.push_str(&format!(
            "  Generated:           {}\n",
            self.generated_at.to_rfc3339()
        ));
        s.push_str(&format!("  Request:             {}\n", self.request_id));

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
