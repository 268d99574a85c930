//! List rules command.

use anyhow::Result;
use tickerlens_config::AppConfig;
use tickerlens_rules::RuleRegistry;

pub async fn run(config: &AppConfig) -> Result<()> {
    let registry = RuleRegistry::new(&config.rules);

    println!("Recommendation Rules");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for (position, info) in registry.list().iter().enumerate() {
        println!("  {}. {}", position + 1, info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);

        let requires: Vec<&str> = info.requires.iter().map(|kind| kind.as_str()).collect();
        println!("  Requires:   {}", requires.join(", "));
        for (name, value) in &info.parameters {
            println!("  {:<11} {}", format!("{}:", name), value);
        }
        println!();
    }

    println!("Each CAUTION vote cancels one BUY vote. BUY wins on more BUY than");
    println!("SELL votes, SELL on more SELL than BUY, otherwise HOLD.");
    println!(
        "Confidence is degraded when {} or more required indicators are unavailable.",
        config.rules.degraded_after_missing
    );

    Ok(())
}
