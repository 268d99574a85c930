//! Alpha Vantage daily time series provider.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use tickerlens_core::{CompanyProfile, DateRange, FetchError, Quote, QuoteFetcher, Symbol};

use super::send;

/// Calendar days covered by a `compact` (100 trading day) response.
const COMPACT_SPAN_DAYS: i64 = 140;

/// Alpha Vantage `TIME_SERIES_DAILY` provider.
#[derive(Debug, Clone)]
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    key_env: String,
}

impl AlphaVantageProvider {
    pub const ID: &'static str = "alphavantage";
    pub const DEFAULT_BASE_URL: &'static str = "https://www.alphavantage.co/query";
    pub const DEFAULT_KEY_ENV: &'static str = "ALPHAVANTAGE_API_KEY";

    /// Create a provider with an explicit key.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            key_env: Self::DEFAULT_KEY_ENV.to_string(),
        }
    }

    /// Create a provider reading its key from the environment variable `key_env`.
    pub fn from_env(client: reqwest::Client, base_url: impl Into<String>, key_env: &str) -> Self {
        let mut provider = Self::new(client, base_url, std::env::var(key_env).ok());
        provider.key_env = key_env.to_string();
        provider
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| FetchError::MissingCredentials(self.key_env.clone()))
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<String, FetchError> {
        let (status, body) = send(self.client.get(&self.base_url).query(params)).await?;
        if !(200..300).contains(&status) {
            return Err(FetchError::from_status(status));
        }
        Ok(body)
    }

    fn output_size(range: &DateRange, today: NaiveDate) -> &'static str {
        if (today - range.start()).num_days() <= COMPACT_SPAN_DAYS {
            "compact"
        } else {
            "full"
        }
    }
}

#[async_trait]
impl QuoteFetcher for AlphaVantageProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_quotes(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<Quote>, FetchError> {
        let api_key = self.key()?;

        let output_size = Self::output_size(range, Utc::now().date_naive());
        debug!(%symbol, output_size, "Requesting Alpha Vantage daily series");

        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", output_size),
                ("apikey", api_key),
            ])
            .await?;

        parse_daily_series(&body)
    }

    async fn company_profile(&self, symbol: &Symbol) -> Result<Option<CompanyProfile>, FetchError> {
        let api_key = self.key()?;
        debug!(%symbol, "Requesting Alpha Vantage company overview");

        let body = self
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", symbol.as_str()),
                ("apikey", api_key),
            ])
            .await?;

        parse_overview(&body)
    }
}

/// Map the error and notice fields Alpha Vantage sends with status 200.
fn check_notices(payload: &Value) -> Result<(), FetchError> {
    if let Some(message) = payload.get("Error Message").and_then(Value::as_str) {
        return Err(FetchError::InvalidSymbol(message.to_string()));
    }
    for key in ["Note", "Information"] {
        if let Some(message) = payload.get(key).and_then(Value::as_str) {
            return Err(classify_notice(message));
        }
    }
    Ok(())
}

/// Throttling notices are transient. Premium-only notices (an endpoint, or
/// `outputsize=full` on a free key) will never succeed on retry.
fn classify_notice(message: &str) -> FetchError {
    let lower = message.to_ascii_lowercase();
    let premium_only =
        lower.contains("premium endpoint") || lower.contains("premium feature");
    if premium_only && !lower.contains("rate limit") {
        FetchError::Unsupported(message.to_string())
    } else {
        FetchError::RateLimited(message.to_string())
    }
}

/// Parse a `TIME_SERIES_DAILY` payload into quotes (newest first, as sent).
fn parse_daily_series(body: &str) -> Result<Vec<Quote>, FetchError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    check_notices(&payload)?;

    let series = payload
        .as_object()
        .and_then(|map| {
            map.iter()
                .find(|(key, _)| key.starts_with("Time Series"))
                .map(|(_, value)| value)
        })
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Malformed("no time series in response".into()))?;

    series
        .iter()
        .map(|(date, fields)| parse_row(date, fields))
        .collect()
}

/// Parse an `OVERVIEW` payload. Unknown symbols come back as `{}`.
fn parse_overview(body: &str) -> Result<Option<CompanyProfile>, FetchError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    check_notices(&payload)?;

    // Missing values are sent as "None" or "-"
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
            .map(str::to_string)
    };
    let number = |key: &str| text(key).and_then(|v| v.parse::<f64>().ok());

    let Some(name) = text("Name") else {
        return Ok(None);
    };

    Ok(Some(CompanyProfile {
        name,
        exchange: text("Exchange"),
        sector: text("Sector"),
        industry: text("Industry"),
        market_cap: number("MarketCapitalization"),
        pe_ratio: number("PERatio"),
        dividend_yield: number("DividendYield"),
    }))
}

fn parse_row(date: &str, fields: &Value) -> Result<Quote, FetchError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| FetchError::Malformed(format!("invalid date '{date}': {e}")))?;

    let number = |key: &str| -> Result<f64, FetchError> {
        fields
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .ok_or_else(|| FetchError::Malformed(format!("missing or invalid '{key}' on {date}")))
    };

    let volume = number("5. volume")?;

    Ok(Quote::new(
        date,
        number("1. open")?,
        number("2. high")?,
        number("3. low")?,
        number("4. close")?,
        volume.max(0.0) as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": {
            "2024-06-28": {"1. open": "170.0", "2. high": "172.5", "3. low": "169.1", "4. close": "171.2", "5. volume": "4100200"},
            "2024-06-27": {"1. open": "168.0", "2. high": "170.1", "3. low": "167.5", "4. close": "169.9", "5. volume": "3900000"}
        }
    }"#;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_daily_series() {
        let mut quotes = parse_daily_series(PAYLOAD).unwrap();
        quotes.sort_by_key(|q| q.date);

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, day(2024, 6, 27));
        assert!((quotes[1].close - 171.2).abs() < 1e-9);
        assert_eq!(quotes[1].volume, 4_100_200);
    }

    #[test]
    fn test_error_payloads() {
        assert!(matches!(
            parse_daily_series(r#"{"Error Message": "Invalid API call."}"#),
            Err(FetchError::InvalidSymbol(_))
        ));
        assert!(matches!(
            parse_daily_series(r#"{"Note": "Thank you for using Alpha Vantage!"}"#),
            Err(FetchError::RateLimited(_))
        ));
        assert!(matches!(
            parse_daily_series(r#"{"Information": "rate limit"}"#),
            Err(FetchError::RateLimited(_))
        ));
        assert!(matches!(
            parse_daily_series(r#"{"Meta Data": {}}"#),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(parse_daily_series("<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_unparseable_row_is_malformed() {
        let body = r#"{"Time Series (Daily)": {"2024-06-28": {"1. open": "n/a", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"}}}"#;
        assert!(matches!(parse_daily_series(body), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_output_size() {
        let today = day(2024, 12, 31);
        let recent = DateRange::trailing(today, 60).unwrap();
        let long = DateRange::trailing(today, 400).unwrap();

        assert_eq!(AlphaVantageProvider::output_size(&recent, today), "compact");
        assert_eq!(AlphaVantageProvider::output_size(&long, today), "full");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = reqwest::Client::new();
        // Unroutable base URL: the call must not get that far
        let provider = AlphaVantageProvider::new(client, "http://127.0.0.1:9/query", None);

        let error = provider
            .fetch_quotes(
                &Symbol::parse("IBM").unwrap(),
                &DateRange::trailing(day(2024, 6, 28), 30).unwrap(),
            )
            .await
            .unwrap_err();

        assert_eq!(
            error,
            FetchError::MissingCredentials("ALPHAVANTAGE_API_KEY".into())
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn test_premium_notice_is_not_retried() {
        let full = r#"{"Information": "Thank you for using Alpha Vantage! The **outputsize=full** parameter value is a premium feature for the TIME_SERIES_DAILY endpoint. You may subscribe to any of the premium plans at https://www.alphavantage.co/premium/ to instantly unlock all premium features"}"#;
        let endpoint = r#"{"Information": "Thank you for using Alpha Vantage! This is a premium endpoint. You may subscribe to any of the premium plans at https://www.alphavantage.co/premium/ to instantly unlock all premium endpoints"}"#;
        let daily_cap = r#"{"Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day. Please subscribe to any of the premium plans at https://www.alphavantage.co/premium/ to instantly remove all daily rate limits."}"#;

        for body in [full, endpoint] {
            let error = parse_daily_series(body).unwrap_err();
            assert!(matches!(error, FetchError::Unsupported(_)));
            assert!(!error.is_transient());
        }

        let error = parse_daily_series(daily_cap).unwrap_err();
        assert!(matches!(error, FetchError::RateLimited(_)));
        assert!(error.is_transient());
    }

    #[test]
    fn test_parse_overview() {
        let body = r#"{
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Exchange": "NYSE",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "MarketCapitalization": "157190521000",
            "PERatio": "19.02",
            "DividendYield": "None"
        }"#;

        let profile = parse_overview(body).unwrap().unwrap();

        assert_eq!(profile.name, "International Business Machines");
        assert_eq!(profile.exchange.as_deref(), Some("NYSE"));
        assert_eq!(profile.sector.as_deref(), Some("TECHNOLOGY"));
        assert_eq!(profile.market_cap, Some(157_190_521_000.0));
        assert_eq!(profile.pe_ratio, Some(19.02));
        assert_eq!(profile.dividend_yield, None);
    }

    #[test]
    fn test_overview_without_company() {
        assert_eq!(parse_overview("{}").unwrap(), None);
        assert!(matches!(
            parse_overview(r#"{"Note": "Thank you for using Alpha Vantage!"}"#),
            Err(FetchError::RateLimited(_))
        ));
    }
}
