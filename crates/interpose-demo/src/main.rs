//! # interpose-demo
//!
//! Runs a `[log, auth, target]` interceptor chain over the command-line
//! arguments and prints the result as JSON.

#![deny(unsafe_code)]

mod chain;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use interpose::logging::{LogFormat, init_subscriber};
use interpose_settings::{load_settings, load_settings_from_path, loader::parse_log_level};

/// Interceptor chain demo.
#[derive(Parser, Debug)]
#[command(name = "interpose-demo", about = "Run an interceptor chain over the given arguments")]
struct Cli {
    /// Arguments passed to the target. A first argument equal to the deny
    /// token is refused by the auth interceptor.
    args: Vec<String>,

    /// Settings file (defaults to `~/.interpose/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (overrides settings).
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (overrides settings).
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Also replay the rest of the chain on a clone with upper-cased arguments.
    #[arg(long)]
    fork: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => load_settings().context("Failed to load settings")?,
    };
    if let Some(level) = &cli.log_level {
        settings.logging.level = parse_log_level(level)
            .with_context(|| format!("Unknown log level: {level}"))?;
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    init_subscriber(&settings.logging.level, settings.logging.format);
    tracing::debug!(?settings, "settings loaded");

    let mut context = chain::build_context(cli.args, &settings.demo.deny_token, cli.fork);
    let result = context.proceed().context("Invocation failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
