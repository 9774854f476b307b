// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use explore_orchestrator_core::domain::gateway_config::GatewayConfigManifest;

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./explore-config.yaml)
        #[arg(short, long, default_value = "./explore-config.yaml")]
        output: PathBuf,

        /// Include every content service and observability settings
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(&output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. EXPLORE_CONFIG_PATH: {}",
            std::env::var("EXPLORE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./explore-config.yaml");
        println!("  4. ~/.explore/config.yaml");
        println!("  5. /etc/explore/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Gateway:".bold());
    println!("  Name: {}", config.metadata.name);
    println!(
        "  Listen: {}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );
    println!();

    println!("{}", "Backends:".bold());
    println!(
        "  Directory: {} (timeout {}s)",
        config.spec.directory.base_url, config.spec.directory.timeout_seconds
    );
    match &config.spec.user_admin {
        Some(user_admin) => println!("  User admin: {}", user_admin.base_url),
        None => println!("  User admin: {}", "(not set, quotas disabled)".dimmed()),
    }
    println!();

    println!("{}", "Content services:".bold());
    if config.spec.content_services.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for service in &config.spec.content_services {
        println!("  {} -> {}{}", service.name.bold(), service.base_url, service.path);
        let keys: Vec<String> = service.type_keys().iter().map(|k| k.to_string()).collect();
        println!("    Types: {}", keys.join(", "));
        if service.metadata {
            println!("    Metadata: yes");
        }
    }
    println!();

    let logging = config.logging();
    println!("{}", "Observability:".bold());
    println!("  Logging: {} ({})", logging.level, logging.format);
    match config.metrics() {
        Some(metrics) => println!("  Metrics: port {}", metrics.port),
        None => println!("  Metrics: {}", "disabled".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn template(with_examples: bool) -> &'static str {
    if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    }
}

async fn generate(output: &Path, with_examples: bool) -> Result<()> {
    std::fs::write(output, template(with_examples))
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid() {
        for with_examples in [false, true] {
            let config = GatewayConfigManifest::from_yaml_str(template(with_examples)).unwrap();
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_examples_template_covers_metadata_types() {
        let config = GatewayConfigManifest::from_yaml_str(EXAMPLES_TEMPLATE).unwrap();
        assert!(config.spec.user_admin.is_some());
        assert!(config.spec.content_services.iter().any(|s| s.metadata));
    }

    #[tokio::test]
    async fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("explore-config.yaml");
        generate(&output, false).await.unwrap();

        let written = GatewayConfigManifest::from_yaml_file(&output).unwrap();
        assert_eq!(written.kind, "GatewayConfig");
    }
}
