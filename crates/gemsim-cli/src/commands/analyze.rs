//! Offline transcript analysis

use crate::context::CliContext;
use crate::output::format_verdict;
use anyhow::Result;
use gemsim_effects::TranscriptDigestHandler;

pub async fn run(mut ctx: CliContext) -> Result<bool> {
    let results = ctx.workbench.run_all().await;
    let mut all_passed = true;
    for (id, result) in results {
        match result {
            Ok(verdict) => {
                all_passed &= verdict.passed;
                println!("{}", format_verdict(&verdict));
            }
            Err(err) => {
                all_passed = false;
                eprintln!("{id}: {err}");
            }
        }
    }

    let report = ctx.workbench.analyze(&TranscriptDigestHandler::new()).await;
    println!();
    println!("{}", report.summary);
    if !report.anomalies.is_empty() {
        println!("Anomalies:");
        for anomaly in &report.anomalies {
            println!("  - {anomaly}");
        }
    }
    println!("Recommendations:");
    for recommendation in &report.recommendations {
        println!("  - {recommendation}");
    }
    Ok(all_passed)
}
