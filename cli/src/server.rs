// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway HTTP server bootstrap

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use explore_orchestrator_core::{
    domain::gateway_config::{GatewayConfigManifest, MetricsConfig},
    infrastructure::{event_bus::EventBus, Backends},
    presentation::api::{app, AppState},
};

pub async fn start_server(config: GatewayConfigManifest) -> Result<()> {
    info!("Explore gateway starting: name={}", config.metadata.name);

    if let Some(metrics) = config.metrics() {
        init_metrics_exporter(&config.spec.network.bind_address, metrics)?;
    }

    // Initialize services
    let backends = Backends::from_config(&config).context("Failed to initialize backends")?;
    let event_bus = Arc::new(EventBus::with_default_capacity());
    let state = AppState::from_backends(&backends, event_bus);

    // Start HTTP server
    let addr = format!(
        "{}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        "Gateway listening on {} ({} element types registered)",
        addr,
        backends.registry.len()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");

    Ok(())
}

fn init_metrics_exporter(bind_address: &str, metrics: &MetricsConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind_address, metrics.port)
        .parse()
        .with_context(|| format!("Invalid metrics address {}:{}", bind_address, metrics.port))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics exposed on {}", addr);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
