//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tickerlens_config::DEFAULT_CONFIG_PATH;
use tickerlens_core::DateRange;

#[derive(Parser)]
#[command(name = "tickerlens")]
#[command(author, version, about = "Technical BUY/HOLD/SELL analysis for equity tickers")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more ticker symbols
    Analyze(AnalyzeArgs),
    /// List the recommendation rules and their thresholds
    Rules,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Symbols to analyze (space or comma separated)
    #[arg(required = true, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Calendar days of history when --start is not given
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(DateRange::MAX_TRAILING_DAYS))
    )]
    pub days: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON report(s) to a file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Maximum symbols analyzed at once
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}
