//! Tickerbrief CLI — monitor stock tickers from a natural-language requirement.
//!
//! Commands:
//! - `run` — execute one monitoring pass: interpret the requirement, collect
//!   prices and news, evaluate alerts, compose the brief, notify
//! - `parse` — interpret a requirement and print the sanitized configuration
//!   without running
//!
//! The process exits non-zero only when requirement interpretation fails;
//! every other provider failure degrades inside the run.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tickerbrief_core::interpret::interpret;
use tickerbrief_core::providers::ChatCompletionClient;
use tickerbrief_core::state::WorkflowState;
use tickerbrief_runner::{run, RunContext, Settings};

#[derive(Parser)]
#[command(
    name = "tickerbrief",
    about = "Tickerbrief CLI — plan-driven stock ticker monitoring agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one monitoring pass for a free-text requirement.
    Run {
        /// The requirement, e.g. "Check MSFT and META price and tell me in discord".
        /// Prompted from stdin when omitted.
        requirement: Option<String>,

        /// Path to the operator settings file.
        #[arg(long, default_value = "settings.toml")]
        settings: PathBuf,
    },
    /// Interpret a requirement and print the sanitized configuration.
    Parse {
        /// The requirement. Prompted from stdin when omitted.
        requirement: Option<String>,

        /// Path to the operator settings file.
        #[arg(long, default_value = "settings.toml")]
        settings: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            requirement,
            settings,
        } => cmd_run(requirement, settings),
        Commands::Parse {
            requirement,
            settings,
        } => cmd_parse(requirement, settings),
    }
}

fn cmd_run(requirement: Option<String>, settings_path: PathBuf) -> Result<()> {
    let requirement = resolve_requirement(requirement)?;
    let settings = Settings::load(&settings_path)?;
    let ctx = RunContext::from_settings(&settings);

    let state = run(&requirement, &ctx)
        .context("no valid ticker configuration could be extracted from the requirement")?;
    print_summary(&state);
    Ok(())
}

fn cmd_parse(requirement: Option<String>, settings_path: PathBuf) -> Result<()> {
    let requirement = resolve_requirement(requirement)?;
    let settings = Settings::load(&settings_path)?;

    let api_key = std::env::var(&settings.completion.api_key_env).ok();
    let completion = ChatCompletionClient::new(
        settings.completion.base_url.clone(),
        settings.completion.model.clone(),
        api_key,
    );

    let config = interpret(&requirement, &completion)
        .context("no valid ticker configuration could be extracted from the requirement")?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn resolve_requirement(requirement: Option<String>) -> Result<String> {
    if let Some(req) = requirement {
        return Ok(req);
    }
    print!("I am a stock ticker monitor agent, how can I help you?\n> ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read requirement from stdin")?;
    let line = line.trim().to_string();
    anyhow::ensure!(!line.is_empty(), "no requirement given");
    Ok(line)
}

fn print_summary(state: &WorkflowState) {
    println!();
    println!("=== Run Summary ===");
    if let Some(config) = &state.configuration {
        println!("Tickers:    {}", config.tickers.join(", "));
        println!("Threshold:  {:.1}%", config.alert_threshold);
    }
    println!(
        "Snapshots:  {}",
        state.snapshots.as_ref().map_or(0, Vec::len)
    );
    println!("Alerts:     {}", state.alerts.len());
    for alert in &state.alerts {
        println!("  {alert}");
    }
}
