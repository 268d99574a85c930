//! Configuration structures.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tickerlens_analysis::DEFAULT_HISTORY_DAYS;
use tickerlens_core::{DateRange, SettingsError, ValidateConfig};
use tickerlens_data::{
    AlphaVantageProvider, Backoff, CsvProvider, FetchPolicy, RetryConfig, SeriesCache,
    YahooProvider,
};
use tickerlens_indicators::IndicatorConfig;
use tickerlens_rules::RuleConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Calendar days of history fetched when no range is given
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub rules: RuleConfig,
}

fn default_history_days() -> u32 {
    DEFAULT_HISTORY_DAYS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_days: DEFAULT_HISTORY_DAYS,
            app: AppSettings::default(),
            logging: LoggingConfig::default(),
            providers: ProvidersConfig::default(),
            fetch: FetchSettings::default(),
            cache: CacheSettings::default(),
            indicators: IndicatorConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl ValidateConfig for AppConfig {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.history_days == 0 || self.history_days > DateRange::MAX_TRAILING_DAYS {
            return Err(SettingsError::Invalid(format!(
                "history_days must be between 1 and {}, got {}",
                DateRange::MAX_TRAILING_DAYS,
                self.history_days
            )));
        }
        self.logging.validate()?;
        self.providers.validate()?;
        self.fetch.validate()?;
        self.cache.validate()?;
        self.indicators.validate()?;
        self.rules.validate()
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "tickerlens".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily rolling log file, in addition to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl ValidateConfig for LoggingConfig {
    fn validate(&self) -> Result<(), SettingsError> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(SettingsError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{other}\""
            ))),
        }
    }
}

/// A quote provider that can appear in `providers.order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    AlphaVantage,
    Yahoo,
    Csv,
}

impl ProviderKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::AlphaVantage => AlphaVantageProvider::ID,
            Self::Yahoo => YahooProvider::ID,
            Self::Csv => CsvProvider::ID,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Provider order and per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Failover order, primary first
    pub order: Vec<ProviderKind>,
    /// Ask the serving provider for a company overview after each fetch
    pub company_profile: bool,
    pub alphavantage: AlphaVantageConfig,
    pub yahoo: YahooConfig,
    pub csv: CsvConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: vec![ProviderKind::AlphaVantage, ProviderKind::Yahoo],
            company_profile: true,
            alphavantage: AlphaVantageConfig::default(),
            yahoo: YahooConfig::default(),
            csv: CsvConfig::default(),
        }
    }
}

impl ValidateConfig for ProvidersConfig {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.order.is_empty() {
            return Err(SettingsError::Invalid(
                "providers.order must name at least one provider".into(),
            ));
        }

        let mut seen = HashSet::new();
        for kind in &self.order {
            if !seen.insert(kind) {
                return Err(SettingsError::Invalid(format!(
                    "provider \"{kind}\" appears more than once in providers.order"
                )));
            }
        }

        if self.order.contains(&ProviderKind::Csv) && self.csv.dir.is_none() {
            return Err(SettingsError::Invalid(
                "providers.csv.dir is required when csv is in providers.order".into(),
            ));
        }
        Ok(())
    }
}

/// Alpha Vantage settings. The key itself is only read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: AlphaVantageProvider::DEFAULT_BASE_URL.to_string(),
            api_key_env: AlphaVantageProvider::DEFAULT_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YahooProvider::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Directory of `<SYMBOL>.csv` files
    pub dir: Option<PathBuf>,
}

/// Timeout, retry and backoff applied to every provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_factor: f64,
    pub backoff_max_ms: u64,
    pub jitter: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 2,
            backoff_base_ms: 500,
            backoff_factor: 2.0,
            backoff_max_ms: 8_000,
            jitter: true,
        }
    }
}

impl FetchSettings {
    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            retry: RetryConfig {
                max_retries: self.max_retries,
                backoff: Backoff::Exponential {
                    base: Duration::from_millis(self.backoff_base_ms),
                    factor: self.backoff_factor,
                    max: Duration::from_millis(self.backoff_max_ms),
                    jitter: self.jitter,
                },
            },
        }
    }
}

impl ValidateConfig for FetchSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "fetch.timeout_ms must be greater than 0".into(),
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(SettingsError::Invalid(format!(
                "fetch.backoff_factor must be at least 1.0, got {}",
                self.backoff_factor
            )));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(SettingsError::Invalid(
                "fetch.backoff_max_ms must not be below fetch.backoff_base_ms".into(),
            ));
        }
        Ok(())
    }
}

/// Longest series cache TTL accepted, 30 days.
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Series cache bounds. A zero TTL or capacity disables the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            capacity: 256,
        }
    }
}

impl CacheSettings {
    pub fn is_enabled(&self) -> bool {
        self.ttl_secs > 0 && self.capacity > 0
    }

    pub fn build(&self) -> SeriesCache {
        SeriesCache::new(Duration::from_secs(self.ttl_secs), self.capacity)
    }
}

impl ValidateConfig for CacheSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(SettingsError::Invalid(format!(
                "cache.ttl_secs must be at most {MAX_CACHE_TTL_SECS}, got {}",
                self.ttl_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.history_days, 400);
        assert_eq!(
            config.providers.order,
            vec![ProviderKind::AlphaVantage, ProviderKind::Yahoo]
        );
        assert_eq!(config.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = FetchSettings {
            timeout_ms: 2_500,
            max_retries: 4,
            jitter: false,
            ..Default::default()
        };
        let policy = settings.policy();

        assert_eq!(policy.timeout, Duration::from_millis(2_500));
        assert_eq!(policy.retry.max_retries, 4);
        assert_eq!(policy.retry.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.retry.delay_for_attempt(1), Duration::from_millis(1_000));
        assert_eq!(policy.retry.delay_for_attempt(10), Duration::from_millis(8_000));
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let mut config = AppConfig::default();
        config.providers.order = vec![ProviderKind::Yahoo, ProviderKind::Yahoo];

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_csv_requires_dir() {
        let mut config = AppConfig::default();
        config.providers.order = vec![ProviderKind::Csv];
        assert!(config.validate().is_err());

        config.providers.csv.dir = Some(PathBuf::from("data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_sections_validated() {
        let mut config = AppConfig::default();
        config.rules.degraded_after_missing = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fetch.backoff_factor = 0.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_days_bounded() {
        let mut config = AppConfig::default();
        config.history_days = DateRange::MAX_TRAILING_DAYS;
        assert!(config.validate().is_ok());

        config.history_days = u32::MAX;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("history_days"));

        config.history_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_ttl_bounded() {
        let mut config = AppConfig::default();
        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(config.validate().is_ok());

        config.cache.ttl_secs = u64::MAX;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("cache.ttl_secs"));

        // Zero still means disabled, not invalid
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_ok());
        assert!(!config.cache.is_enabled());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.providers.order = vec![ProviderKind::Yahoo, ProviderKind::Csv];
        config.providers.csv.dir = Some(PathBuf::from("data"));

        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.providers.order, config.providers.order);
        assert_eq!(parsed.providers.csv.dir, config.providers.csv.dir);
        assert_eq!(parsed.indicators, config.indicators);
    }
}
