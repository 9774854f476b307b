// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Backend Factory
//!
//! Turns the gateway configuration into concrete backend clients and the
//! immutable [`TypeRegistry`]. Runs once at startup.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::content::ContentService;
use crate::domain::directory::DirectoryClient;
use crate::domain::gateway_config::GatewayConfigManifest;
use crate::domain::type_registry::TypeRegistry;
use crate::domain::user_admin::UserAdminClient;
use crate::infrastructure::http::{HttpContentService, HttpDirectoryClient, HttpUserAdminClient};

/// Every remote collaborator the gateway talks to
#[derive(Clone)]
pub struct Backends {
    pub directory: Arc<dyn DirectoryClient>,
    pub user_admin: Option<Arc<dyn UserAdminClient>>,
    pub registry: Arc<TypeRegistry>,
}

impl Backends {
    pub fn from_config(config: &GatewayConfigManifest) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.spec.directory.timeout_seconds);

        let directory = HttpDirectoryClient::new(config.spec.directory.base_url.clone(), timeout)
            .context("Failed to create directory client")?;

        let user_admin: Option<Arc<dyn UserAdminClient>> = match &config.spec.user_admin {
            Some(user_admin) => {
                let client = HttpUserAdminClient::new(user_admin.base_url.clone(), timeout)
                    .context("Failed to create user-admin client")?;
                Some(Arc::new(client))
            }
            None => {
                info!("No user-admin service configured, case quotas are disabled");
                None
            }
        };

        Ok(Self {
            directory: Arc::new(directory),
            user_admin,
            registry: Arc::new(build_type_registry(config)?),
        })
    }
}

/// Build the type registry from `spec.content_services`
pub fn build_type_registry(config: &GatewayConfigManifest) -> anyhow::Result<TypeRegistry> {
    let timeout = Duration::from_secs(config.spec.directory.timeout_seconds);
    let mut builder = TypeRegistry::builder();

    info!("Initializing element type registry");

    for service_config in &config.spec.content_services {
        let service: Arc<dyn ContentService> = Arc::new(
            HttpContentService::new(
                service_config.name.clone(),
                service_config.base_url.clone(),
                service_config.path.clone(),
                timeout,
            )
            .with_context(|| format!("Failed to create content client '{}'", service_config.name))?,
        );

        for key in service_config.type_keys() {
            info!(
                "Mapping element type {} -> {} (metadata: {})",
                key, service_config.name, service_config.metadata
            );
            builder = builder.register(key, service.clone(), service_config.metadata);
        }
    }

    let registry = builder.build().context("Invalid content service configuration")?;
    if registry.is_empty() {
        warn!("No content services configured - every element operation will fail");
    }
    Ok(registry)
}
