//! Conversion of settings into runtime objects.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use tickerlens_analysis::Analyzer;
use tickerlens_core::{FetchError, QuoteFetcher, SettingsError};
use tickerlens_data::{
    providers::http_client, AlphaVantageProvider, CsvProvider, PriceSource, YahooProvider,
};
use tickerlens_indicators::IndicatorEngine;
use tickerlens_rules::RecommendationEngine;

use crate::{AppConfig, ProviderKind};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// Instantiate the configured providers in failover order.
pub fn build_providers(config: &AppConfig) -> Result<Vec<Arc<dyn QuoteFetcher>>, RuntimeError> {
    let needs_http = config
        .providers
        .order
        .iter()
        .any(|kind| matches!(kind, ProviderKind::AlphaVantage | ProviderKind::Yahoo));
    let client = if needs_http {
        Some(http_client()?)
    } else {
        None
    };

    let mut providers: Vec<Arc<dyn QuoteFetcher>> = Vec::with_capacity(config.providers.order.len());
    for kind in &config.providers.order {
        let provider: Arc<dyn QuoteFetcher> = match (kind, &client) {
            (ProviderKind::AlphaVantage, Some(client)) => {
                let settings = &config.providers.alphavantage;
                let provider = AlphaVantageProvider::from_env(
                    client.clone(),
                    settings.base_url.clone(),
                    &settings.api_key_env,
                );
                if !provider.has_key() {
                    warn!(
                        env = %settings.api_key_env,
                        "Alpha Vantage API key not set; provider will fail over"
                    );
                }
                Arc::new(provider)
            }
            (ProviderKind::Yahoo, Some(client)) => Arc::new(YahooProvider::new(
                client.clone(),
                config.providers.yahoo.base_url.clone(),
            )),
            (ProviderKind::Csv, _) => {
                let dir = config.providers.csv.dir.clone().ok_or_else(|| {
                    SettingsError::Invalid("providers.csv.dir is not set".into())
                })?;
                Arc::new(CsvProvider::new(dir))
            }
            (kind, None) => {
                return Err(SettingsError::Invalid(format!(
                    "provider \"{kind}\" requires an HTTP client"
                ))
                .into())
            }
        };
        providers.push(provider);
    }

    Ok(providers)
}

/// Build the failover source, with the shared cache when enabled.
pub fn build_source(config: &AppConfig) -> Result<PriceSource, RuntimeError> {
    let source = PriceSource::new(build_providers(config)?, config.fetch.policy())
        .with_cache(config.cache.build())
        .with_company_profiles(config.providers.company_profile);

    info!(
        providers = ?source.provider_ids(),
        company_profile = config.providers.company_profile,
        cache_enabled = config.cache.is_enabled(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Price source ready"
    );
    Ok(source)
}

/// Build the full analysis pipeline.
pub fn build_analyzer(config: &AppConfig) -> Result<Analyzer, RuntimeError> {
    let indicators = IndicatorEngine::new(config.indicators.clone())?;
    let rules = RecommendationEngine::new(config.rules.clone())?;

    Ok(Analyzer::new(build_source(config)?, indicators, rules)
        .with_history_days(config.history_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_order() {
        let providers = build_providers(&AppConfig::default()).unwrap();
        let ids: Vec<&str> = providers.iter().map(|p| p.id()).collect();

        assert_eq!(ids, vec!["alphavantage", "yahoo"]);
    }

    #[test]
    fn test_csv_only() {
        let mut config = AppConfig::default();
        config.providers.order = vec![ProviderKind::Csv];
        config.providers.csv.dir = Some(PathBuf::from("data"));
        config.history_days = 250;

        let analyzer = build_analyzer(&config).unwrap();

        assert_eq!(analyzer.source().provider_ids(), vec!["csv"]);
        assert_eq!(analyzer.history_days(), 250);
        assert!(analyzer.source().cache().is_some());
    }

    #[test]
    fn test_company_profile_toggle() {
        let mut config = AppConfig::default();
        assert!(build_source(&config).unwrap().company_profiles());

        config.providers.company_profile = false;
        assert!(!build_source(&config).unwrap().company_profiles());
    }

    #[test]
    fn test_invalid_engine_settings() {
        let mut config = AppConfig::default();
        config.indicators.fast_window = 0;

        assert!(matches!(
            build_analyzer(&config),
            Err(RuntimeError::Settings(_))
        ));
    }
}
