//! bazaar - command-line storefront, seller console and admin console for
//! the Bazaar marketplace.
//!
//! Every subcommand goes through the `bazaar-core` API client, so session
//! refresh and failure notices behave the same everywhere. `--json` prints
//! the `{success, data|error}` outcome instead of human output.

mod app;
mod commands;
mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bazaar_core::Config;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::CommandFailed;
use commands::Command;

/// Log file name inside `--log-dir`, rotated daily
const LOG_FILE: &str = "bazaar.log";

#[derive(Parser)]
#[command(
    name = "bazaar",
    about = "Storefront, seller console and admin console for the Bazaar marketplace",
    version
)]
struct Cli {
    /// Print the raw {success, data|error} outcome as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true, value_name = "DIR", env = "BAZAAR_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Result<()> {
    // RUST_LOG wins; otherwise warn, or debug in dev mode
    let default_level = if Config::dev_mode() { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            Some(fmt::layer().with_writer(appender).with_ansi(false).with_target(true))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_dir.as_deref()) {
        eprintln!("Warning: {:#}", e);
    }
    info!("bazaar starting");

    match commands::run(cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported
        Err(e) if e.is::<CommandFailed>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
