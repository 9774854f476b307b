// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `explore serve`: load configuration and run the gateway

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use explore_orchestrator_core::domain::gateway_config::GatewayConfigManifest;

use crate::server;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// HTTP API port (overrides spec.network.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bind address (overrides spec.network.bind_address)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

impl ServeArgs {
    fn apply(&self, config: &mut GatewayConfigManifest) {
        if let Some(port) = self.port {
            config.spec.network.port = port;
        }
        if let Some(bind) = &self.bind {
            config.spec.network.bind_address = bind.clone();
        }
    }
}

pub async fn handle_command(args: ServeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let mut config = GatewayConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    args.apply(&mut config);

    config
        .validate()
        .context("Configuration validation failed")?;

    server::start_server(config).await
}
