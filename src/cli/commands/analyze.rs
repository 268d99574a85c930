//! Analyze command implementation.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tickerlens_analysis::{AnalysisReport, CancelToken};
use tickerlens_config::{build_analyzer, AppConfig};
use tickerlens_core::DateRange;
use tracing::{error, info, warn};

use crate::cli::{AnalyzeArgs, OutputFormat};

pub async fn run(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let analyzer = build_analyzer(config).context("Failed to build analysis pipeline")?;
    let range = resolve_range(
        args.start,
        args.end,
        args.days.unwrap_or(config.history_days),
        Utc::now().date_naive(),
    )?;

    info!(symbols = ?args.symbols, %range, "Starting analysis");

    // Ctrl-C cancels every in-flight request
    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling analysis");
            canceller.cancel();
        }
    });

    let results = analyzer
        .analyze_batch(&args.symbols, &range, args.concurrency, &token)
        .await;

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (symbol, result) in args.symbols.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                error!(%symbol, reason = e.reason(), "Analysis failed: {}", e);
                eprintln!("{}: {}", symbol, e);
            }
        }
    }

    match args.output {
        OutputFormat::Json => {
            if !reports.is_empty() {
                println!("{}", to_json(&reports)?);
            }
        }
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.summary());
            }
        }
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, to_json(&reports)?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} analyses failed", failed, args.symbols.len());
    }

    Ok(())
}

/// One report as an object, several as an array.
fn to_json(reports: &[AnalysisReport]) -> Result<String> {
    let json = match reports {
        [report] => report.to_json()?,
        _ => serde_json::to_string_pretty(reports)?,
    };
    Ok(json)
}

fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: u32,
    today: NaiveDate,
) -> Result<DateRange> {
    let end = end.unwrap_or(today);
    let range = match start {
        Some(start) => DateRange::new(start, end)
            .with_context(|| format!("Invalid date range {}..{}", start, end))?,
        None => DateRange::trailing(end, days)
            .with_context(|| format!("Invalid history window of {} days", days))?,
    };
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_trails_today() {
        let today = date(2024, 6, 28);
        let range = resolve_range(None, None, 400, today).unwrap();

        assert_eq!(range.end(), today);
        assert_eq!(range.start(), today - Duration::days(400));
    }

    #[test]
    fn test_explicit_range() {
        let range =
            resolve_range(Some(date(2023, 1, 1)), Some(date(2023, 12, 31)), 400, date(2024, 6, 28))
                .unwrap();

        assert_eq!(range.start(), date(2023, 1, 1));
        assert_eq!(range.end(), date(2023, 12, 31));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let error = resolve_range(None, None, u32::MAX, date(2024, 6, 28)).unwrap_err();
        assert!(error.to_string().contains("Invalid history window"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(resolve_range(Some(date(2024, 7, 1)), None, 400, date(2024, 6, 28)).is_err());
    }

    #[test]
    fn test_empty_batch_serializes_as_array() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }
}
