//! Configuration management.
//!
//! Settings come from a TOML file overlaid with `TICKERLENS__*` environment
//! variables, e.g. `TICKERLENS__FETCH__TIMEOUT_MS=5000`.

mod runtime;
mod settings;

pub use runtime::{build_analyzer, build_providers, build_source, RuntimeError};
pub use settings::{
    AlphaVantageConfig, AppConfig, AppSettings, CacheSettings, CsvConfig, FetchSettings,
    LoggingConfig, ProviderKind, ProvidersConfig, YahooConfig,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;
use tickerlens_core::{SettingsError, ValidateConfig};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "TICKERLENS";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] ConfigError),

    #[error(transparent)]
    Invalid(#[from] SettingsError),
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, LoadError> {
    read(path, true)
}

/// Like [`load_config`], but a missing file yields the defaults plus any
/// environment overrides.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, LoadError> {
    read(path, false)
}

fn read(path: &Path, required: bool) -> Result<AppConfig, LoadError> {
    let config = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: AppConfig = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
history_days = 500

[providers]
order = ["yahoo", "alphavantage"]

[rules]
max_volatility = 0.05

[indicators]
fast_window = 20
"#,
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.history_days, 500);
        assert_eq!(
            config.providers.order,
            vec![ProviderKind::Yahoo, ProviderKind::AlphaVantage]
        );
        assert_eq!(config.rules.max_volatility, 0.05);
        assert_eq!(config.rules.min_momentum, 0.02);
        assert_eq!(config.indicators.fast_window, 20);
        assert_eq!(config.indicators.slow_window, 200);
        assert_eq!(config.fetch.timeout_ms, 10_000);
    }

    #[test]
    fn test_missing_file_is_error_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(load_config(&path), Err(LoadError::Source(_))));
        assert!(load_config_or_default(&path).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config(
            r#"
[indicators]
fast_window = 300
slow_window = 200
"#,
        );

        assert!(matches!(load_config(file.path()), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config(
            r#"
[providers]
order = ["bloomberg"]
"#,
        );

        assert!(matches!(load_config(file.path()), Err(LoadError::Source(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config(
            r#"
[cache]
ttl_secs = 60
capacity = 16
"#,
        );

        std::env::set_var("TICKERLENS__CACHE__TTL_SECS", "0");
        let config = load_config(file.path());
        std::env::remove_var("TICKERLENS__CACHE__TTL_SECS");

        let config = config.unwrap();
        assert_eq!(config.cache.ttl_secs, 0);
        assert_eq!(config.cache.capacity, 16);
        assert!(!config.cache.is_enabled());
    }
}
