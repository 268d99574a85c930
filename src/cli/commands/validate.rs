//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use tickerlens_config::{build_analyzer, AppConfig, LoadError};

pub async fn run(config_path: &Path, loaded: Result<AppConfig, LoadError>) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = build_analyzer(&config) {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    let order: Vec<&str> = config.providers.order.iter().map(|kind| kind.id()).collect();
    println!("Providers: {}", order.join(" -> "));
    println!(
        "Company profile: {}",
        if config.providers.company_profile { "enabled" } else { "disabled" }
    );
    println!(
        "Fetch: timeout {}ms, {} retries",
        config.fetch.timeout_ms, config.fetch.max_retries
    );
    if config.cache.is_enabled() {
        println!(
            "Cache: {}s TTL, {} entries",
            config.cache.ttl_secs, config.cache.capacity
        );
    } else {
        println!("Cache: disabled");
    }
    println!("History: {} days", config.history_days);
    println!(
        "Windows: SMA {}/{}, momentum lag {}, volatility {}",
        config.indicators.fast_window,
        config.indicators.slow_window,
        config.indicators.momentum_lag,
        config.indicators.volatility_window
    );

    Ok(())
}
