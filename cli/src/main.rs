// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Explore Gateway CLI
//!
//! The `explore` binary hosts the element gateway: the saga orchestrator,
//! the authorization gate and the metadata aggregator behind one REST API.
//!
//! ## Commands
//!
//! - `explore serve` - Run the HTTP gateway
//! - `explore config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use explore_orchestrator::commands::{self, ConfigCommand, ServeArgs};
use explore_orchestrator_core::domain::gateway_config::GatewayConfigManifest;

/// Explore gateway - orchestrate directory and content services
#[derive(Parser)]
#[command(name = "explore")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "EXPLORE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true, env = "EXPLORE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config file when one can be read; the
    // command itself reports loading errors once logging is up.
    let logging = GatewayConfigManifest::load_or_default(cli.config.clone())
        .map(|config| config.logging())
        .ok();
    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.as_ref().map(|l| l.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let json = logging.as_ref().is_some_and(|l| l.format == "json");
    init_logging(&level, json)?;

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle_command(args, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .init();
    }

    Ok(())
}
