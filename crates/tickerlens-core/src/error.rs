//! Error types for the analysis pipeline.

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Terminal errors surfaced by a single analysis request.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(#[from] SymbolError),

    #[error("No data available for {symbol}: {} provider(s) failed", .failures.len())]
    DataUnavailable {
        symbol: String,
        failures: Vec<ProviderFailure>,
    },

    #[error("Invalid date range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),
}

impl AnalysisError {
    /// Short machine-readable reason, used in logs and CLI output.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidSymbol(_) => "invalid_symbol",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::InvalidRange(_) => "invalid_range",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "config",
        }
    }
}

/// The last error a provider returned before it was given up on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: FetchError,
    /// Number of calls made to this provider, retries included.
    pub attempts: u32,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (after {} attempt(s))",
            self.provider, self.error, self.attempts
        )
    }
}

/// Ticker validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,

    #[error("symbol '{symbol}' is longer than {max} characters")]
    TooLong { symbol: String, max: usize },

    #[error("symbol '{symbol}' must start with a letter")]
    InvalidStart { symbol: String },

    #[error("symbol '{symbol}' contains invalid character '{ch}' at position {index}")]
    InvalidChar {
        symbol: String,
        ch: char,
        index: usize,
    },
}

/// Date range construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("range start {start} is after range end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("cannot reach back {days} days from {end} (at most {max})")]
    TooLong { end: NaiveDate, days: u32, max: u32 },
}

/// Errors returned by a single quote provider call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("symbol not recognised by provider: {0}")]
    InvalidSymbol(String),

    #[error("no quotes in the requested range")]
    Empty,

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("request rejected with status {status}")]
    Rejected { status: u16 },

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("not available on this plan: {0}")]
    Unsupported(String),
}

impl FetchError {
    /// Whether the same provider may succeed if asked again after a pause.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Timeout(_) | Self::Upstream { .. } | Self::Transport(_)
        )
    }

    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited(format!("status {status}")),
            408 | 500..=599 => Self::Upstream { status },
            _ => Self::Rejected { status },
        }
    }
}

/// Indicator calculation errors. These never leave the indicator engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("No quote at or before {target}")]
    NoHistoryAt { target: NaiveDate },
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::RateLimited("slow down".into()).is_transient());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(FetchError::Upstream { status: 503 }.is_transient());
        assert!(FetchError::Transport("reset".into()).is_transient());

        assert!(!FetchError::InvalidSymbol("ZZZZ".into()).is_transient());
        assert!(!FetchError::Empty.is_transient());
        assert!(!FetchError::Malformed("bad json".into()).is_transient());
        assert!(!FetchError::Rejected { status: 403 }.is_transient());
        assert!(!FetchError::MissingCredentials("KEY".into()).is_transient());
        assert!(!FetchError::Unsupported("premium endpoint".into()).is_transient());
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(FetchError::from_status(429), FetchError::RateLimited(_)));
        assert_eq!(FetchError::from_status(502), FetchError::Upstream { status: 502 });
        assert_eq!(FetchError::from_status(408), FetchError::Upstream { status: 408 });
        assert_eq!(FetchError::from_status(401), FetchError::Rejected { status: 401 });
    }

    #[test]
    fn test_data_unavailable_message() {
        let error = AnalysisError::DataUnavailable {
            symbol: "AAPL".into(),
            failures: vec![
                ProviderFailure {
                    provider: "alphavantage".into(),
                    error: FetchError::RateLimited("note".into()),
                    attempts: 3,
                },
                ProviderFailure {
                    provider: "yahoo".into(),
                    error: FetchError::Upstream { status: 500 },
                    attempts: 3,
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "No data available for AAPL: 2 provider(s) failed"
        );
        assert_eq!(error.reason(), "data_unavailable");
    }
}
