//! Offline CSV directory provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::debug;

use tickerlens_core::{DateRange, FetchError, Quote, QuoteFetcher, Symbol};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close", default)]
    close: Option<f64>,
    /// Only used when the file has no plain close column.
    #[serde(rename = "Adj Close", alias = "adj_close", default)]
    adj_close: Option<f64>,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Reads `{SYMBOL}.csv` style files from a directory.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub const ID: &'static str = "csv";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First existing candidate file for `symbol`.
    fn locate(&self, symbol: &Symbol) -> Option<PathBuf> {
        let upper = symbol.as_str();
        let lower = upper.to_ascii_lowercase();
        [
            format!("{upper}.csv"),
            format!("{lower}.csv"),
            format!("{upper}_daily.csv"),
        ]
        .into_iter()
        .map(|name| self.dir.join(name))
        .find(|path| path.is_file())
    }
}

#[async_trait]
impl QuoteFetcher for CsvProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn fetch_quotes(
        &self,
        symbol: &Symbol,
        _range: &DateRange,
    ) -> Result<Vec<Quote>, FetchError> {
        let path = self
            .locate(symbol)
            .ok_or_else(|| FetchError::InvalidSymbol(symbol.to_string()))?;
        debug!(%symbol, path = %path.display(), "Loading quotes from CSV");

        tokio::task::spawn_blocking(move || load_quotes(&path))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
    }
}

fn load_quotes(path: &Path) -> Result<Vec<Quote>, FetchError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut quotes = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| FetchError::Malformed(e.to_string()))?;
        let date = parse_date(&record.date)?;
        let close = record
            .close
            .or(record.adj_close)
            .ok_or_else(|| FetchError::Malformed(format!("no close price on {date}")))?;

        quotes.push(Quote::new(
            date,
            record.open,
            record.high,
            record.low,
            close,
            record.volume.max(0.0) as u64,
        ));
    }

    Ok(quotes)
}

/// Parse various date formats.
fn parse_date(raw: &str) -> Result<NaiveDate, FetchError> {
    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }

    Err(FetchError::Malformed(format!("Could not parse date: {raw}")))
}
