//! tickerlens CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tickerlens_config::{load_config, load_config_or_default, DEFAULT_CONFIG_PATH};
use tickerlens_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The default file is optional; an explicit one must exist
    let loaded = if cli.config.as_os_str() == DEFAULT_CONFIG_PATH {
        load_config_or_default(&cli.config)
    } else {
        load_config(&cli.config)
    };

    // Setup logging
    let (level, json, file) = match &loaded {
        Ok(config) => (
            config.logging.level.clone(),
            config.logging.is_json(),
            config.logging.file.clone(),
        ),
        Err(_) => ("info".to_string(), false, None),
    };
    let level = cli.log_level.map_or(level, |l| l.as_str().to_string());
    let _guard = setup_logging(&level, cli.json_logs || json, file.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, &loaded?).await,
        Commands::Rules => cli::commands::rules::run(&loaded?).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, loaded).await,
    }
}
