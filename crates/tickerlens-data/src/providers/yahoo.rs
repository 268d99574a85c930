//! Yahoo Finance chart API provider.

use async_trait::async_trait;
use chrono::{DateTime, Duration};
use serde::Deserialize;
use tracing::debug;

use tickerlens_core::{CompanyProfile, DateRange, FetchError, Quote, QuoteFetcher, Symbol};

use super::send;

/// Yahoo Finance `v8/finance/chart` provider.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub const ID: &'static str = "yahoo";
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Unix second bounds covering every day in `range`.
    fn period(range: &DateRange) -> (i64, i64) {
        let start = range.start().and_time(chrono::NaiveTime::MIN).and_utc();
        let end = (range.end() + Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        (start.timestamp(), end.timestamp())
    }
}

#[async_trait]
impl QuoteFetcher for YahooProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_quotes(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<Quote>, FetchError> {
        let (period1, period2) = Self::period(range);
        debug!(%symbol, period1, period2, "Requesting Yahoo chart");

        let body = self
            .chart(
                symbol,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;

        parse_chart(&body, symbol)
    }

    /// Name and exchange from the chart metadata. The chart API carries no
    /// sector or valuation fields.
    async fn company_profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>, FetchError> {
        debug!(%symbol, "Requesting Yahoo chart metadata");
        let body = self
            .chart(
                symbol,
                &[("range", "1d".to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        parse_chart_profile(&body, symbol)
    }
}

impl YahooProvider {
    async fn chart(&self, symbol: &Symbol, params: &[(&str, String)]) -> Result<String, FetchError> {
        let endpoint = format!("{}/v8/finance/chart/{}", self.base_url, symbol.as_str());
        let request = self
            .client
            .get(&endpoint)
            .header("referer", "https://finance.yahoo.com/")
            .query(params);

        let (status, body) = send(request).await?;
        if status == 404 {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::from_status(status));
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
    full_exchange_name: Option<String>,
    exchange_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// The first chart result, with chart-level errors mapped.
fn chart_result(body: &str, symbol: &Symbol) -> Result<ChartResult, FetchError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(error) = response.chart.error {
        if error.code == "Not Found" {
            return Err(FetchError::InvalidSymbol(symbol.to_string()));
        }
        return Err(FetchError::Malformed(format!(
            "chart error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or(FetchError::Empty)
}

fn parse_chart(body: &str, symbol: &Symbol) -> Result<Vec<Quote>, FetchError> {
    let result = chart_result(body, symbol)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let quotes = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            // Skip rows with any missing price
            let open = at(&quote.open, i)?;
            let high = at(&quote.high, i)?;
            let low = at(&quote.low, i)?;
            let close = at(&quote.close, i)?;
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0).max(0) as u64;
            Some(Quote::new(date, open, high, low, close, volume))
        })
        .collect();

    Ok(quotes)
}

fn parse_chart_profile(body: &str, symbol: &Symbol) -> Result<Option<CompanyProfile>, FetchError> {
    let meta = chart_result(body, symbol)?.meta;
    let Some(name) = meta.long_name.or(meta.short_name).filter(|n| !n.trim().is_empty()) else {
        return Ok(None);
    };

    let mut profile = CompanyProfile::new(name.trim());
    profile.exchange = meta.full_exchange_name.or(meta.exchange_name);
    Ok(Some(profile))
}
