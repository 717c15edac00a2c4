//! Scenario listing, validation and execution

use crate::context::CliContext;
use crate::output::{format_verdict, print_transcript, print_validation_errors};
use anyhow::{Context, Result};
use clap::Args;
use gemsim_core::SimError;
use gemsim_simulator::EngineEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Scenario id plus parameter overrides
#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario identifier
    pub id: String,

    /// Parameter override, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub params: Vec<(String, String)>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Stream engine events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,
}

#[derive(Args)]
pub struct RunAllArgs {
    /// Stream engine events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,
}

pub fn list(ctx: &CliContext) {
    for scenario in ctx.workbench.scenarios() {
        println!(
            "{:<20} {:<4} {} ({} step(s))",
            scenario.id,
            scenario.standard,
            scenario.title,
            scenario.steps.len()
        );
        for decl in &scenario.parameters {
            println!(
                "    {:<10} {:<24} default {}",
                decl.key, decl.label, decl.default_value
            );
        }
    }
}

pub fn validate(mut ctx: CliContext, args: ScenarioArgs) -> Result<bool> {
    let errors = apply_overrides(&mut ctx, &args)?;
    if errors {
        return Ok(false);
    }
    println!("{}: parameters valid", args.id);
    for (key, value) in ctx.workbench.parameter_values(&args.id)? {
        println!("    {key} = {value}");
    }
    Ok(true)
}

pub async fn run(mut ctx: CliContext, args: RunArgs) -> Result<bool> {
    if apply_overrides(&mut ctx, &args.scenario)? {
        return Ok(false);
    }

    let printer = args.events.then(|| spawn_event_printer(&ctx));
    let verdict = ctx.workbench.run_scenario(&args.scenario.id).await;
    let transcript = ctx.workbench.transcript();
    finish_event_printer(ctx, printer).await;

    let verdict = verdict?;
    print_transcript(&transcript);
    println!("{}", format_verdict(&verdict));
    Ok(verdict.passed)
}

pub async fn run_all(mut ctx: CliContext, args: RunAllArgs) -> Result<bool> {
    let printer = args.events.then(|| spawn_event_printer(&ctx));
    let results = ctx.workbench.run_all().await;
    let transcript = ctx.workbench.transcript();
    finish_event_printer(ctx, printer).await;

    print_transcript(&transcript);
    let mut all_passed = true;
    for (id, result) in results {
        match result {
            Ok(verdict) => {
                all_passed &= verdict.passed;
                println!("{}", format_verdict(&verdict));
            }
            Err(SimError::Validation { errors }) => {
                all_passed = false;
                eprintln!("{id}: invalid parameters");
                print_validation_errors(&errors);
            }
            Err(err) => return Err(err).with_context(|| format!("running {id}")),
        }
    }
    Ok(all_passed)
}

/// Apply `-p` overrides; returns whether any validation error remains
fn apply_overrides(ctx: &mut CliContext, args: &ScenarioArgs) -> Result<bool> {
    for (key, value) in &args.params {
        ctx.workbench.set_parameter(&args.id, key, value.clone())?;
    }
    let errors = ctx.workbench.validation_errors(&args.id)?;
    if errors.is_empty() {
        return Ok(false);
    }
    eprintln!("{}: invalid parameters", args.id);
    print_validation_errors(errors);
    Ok(true)
}

fn spawn_event_printer(ctx: &CliContext) -> JoinHandle<()> {
    let mut events = ctx.workbench.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Dropping the context closes the event channel so the printer drains and exits.
async fn finish_event_printer(ctx: CliContext, printer: Option<JoinHandle<()>>) {
    drop(ctx);
    if let Some(handle) = printer {
        if let Err(err) = handle.await {
            tracing::warn!(%err, "event printer task failed");
        }
    }
}

fn print_event(event: &EngineEvent) {
    match serde_json::to_string(event) {
        Ok(line) => eprintln!("{line}"),
        Err(err) => tracing::warn!(%err, "could not encode engine event"),
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
