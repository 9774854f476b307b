// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for the explore gateway, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Directory service and user-admin endpoints
// - Content service endpoints and the element types each one owns
// - Network and observability settings

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::element::{ElementType, ElementTypeKey, ParametersType};

pub const API_VERSION: &str = "gridsuite.org/v1";
pub const KIND: &str = "GatewayConfig";

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigManifest {
    /// API version (must be "gridsuite.org/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: GatewayConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable gateway name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigSpec {
    #[serde(default)]
    pub network: NetworkConfig,

    pub directory: DirectoryConfig,

    /// Quotas are not enforced when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_admin: Option<UserAdminConfig>,

    #[serde(default)]
    pub content_services: Vec<ContentServiceConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub base_url: String,

    /// Per-request timeout for every backing service
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAdminConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentServiceConfig {
    /// Service name used in logs and error reports (e.g. "filter-server")
    pub name: String,

    /// Element types whose payload this service owns
    pub element_types: Vec<ElementType>,

    pub base_url: String,

    /// Resource path under `base_url` (e.g. "/v1/filters")
    pub path: String,

    /// Whether listings should fetch type-specific metadata from this service
    #[serde(default)]
    pub metadata: bool,

    /// Restrict a PARAMETERS service to these sub-types; empty means every
    /// sub-type without a more specific owner
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters_types: Vec<ParametersType>,
}

impl ContentServiceConfig {
    /// Registry keys claimed by this service
    pub fn type_keys(&self) -> Vec<ElementTypeKey> {
        let mut keys = Vec::new();
        for element_type in &self.element_types {
            if *element_type == ElementType::Parameters && !self.parameters_types.is_empty() {
                keys.extend(
                    self.parameters_types
                        .iter()
                        .map(|sub| ElementTypeKey::parameters(*sub)),
                );
            } else {
                keys.push(ElementTypeKey::of(*element_type));
            }
        }
        keys
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus exporter port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5029
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_directory_url() -> String {
    "http://localhost:5026".to_string()
}

impl Default for GatewayConfigSpec {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            directory: DirectoryConfig {
                base_url: default_directory_url(),
                timeout_seconds: default_timeout_seconds(),
            },
            user_admin: None,
            content_services: vec![],
            observability: None,
        }
    }
}

impl Default for GatewayConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "explore-gateway".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewayConfigSpec::default(),
        }
    }
}

impl GatewayConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. EXPLORE_CONFIG_PATH environment variable
    /// 2. ./explore-config.yaml (working directory)
    /// 3. ~/.explore/config.yaml (user home)
    /// 4. /etc/explore/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("EXPLORE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./explore-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".explore").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/explore/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!(
                "No configuration file found in standard locations. Using defaults with no content services."
            );
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("EXPLORE_DIRECTORY_URL") {
            tracing::info!("Environment override: EXPLORE_DIRECTORY_URL={}", url);
            self.spec.directory.base_url = url;
        }

        if let Some(val) = lookup("EXPLORE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: EXPLORE_PORT={}", port);
                    self.spec.network.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for EXPLORE_PORT: '{}'. Expected a port number. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        self.spec
            .observability
            .as_ref()
            .and_then(|o| o.logging.clone())
            .unwrap_or_else(|| LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            })
    }

    /// Metrics settings, only when the exporter is enabled
    pub fn metrics(&self) -> Option<&MetricsConfig> {
        self.spec
            .observability
            .as_ref()
            .and_then(|o| o.metrics.as_ref())
            .filter(|m| m.enabled)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.directory.base_url.is_empty() {
            anyhow::bail!("spec.directory.base_url cannot be empty");
        }

        if let Some(user_admin) = &self.spec.user_admin {
            if user_admin.base_url.is_empty() {
                anyhow::bail!("spec.user_admin.base_url cannot be empty");
            }
        }

        let mut claimed: HashSet<ElementTypeKey> = HashSet::new();
        for service in &self.spec.content_services {
            if service.name.is_empty() {
                anyhow::bail!("Content service name cannot be empty");
            }

            if service.base_url.is_empty() {
                anyhow::bail!("Content service base_url cannot be empty for: {}", service.name);
            }

            if service.element_types.is_empty() {
                anyhow::bail!(
                    "Content service must own at least one element type: {}",
                    service.name
                );
            }

            if service.element_types.contains(&ElementType::Directory) {
                anyhow::bail!(
                    "DIRECTORY cannot be owned by a content service: {}",
                    service.name
                );
            }

            if !service.parameters_types.is_empty()
                && !service.element_types.contains(&ElementType::Parameters)
            {
                anyhow::bail!(
                    "parameters_types requires PARAMETERS in element_types: {}",
                    service.name
                );
            }

            for key in service.type_keys() {
                if !claimed.insert(key) {
                    anyhow::bail!(
                        "Element type {} is claimed by more than one content service (last: {})",
                        key,
                        service.name
                    );
                }
            }
        }

        if let Some(logging) = self.spec.observability.as_ref().and_then(|o| o.logging.as_ref()) {
            if logging.format != "json" && logging.format != "text" {
                anyhow::bail!(
                    "Invalid logging format: '{}'. Must be 'json' or 'text'",
                    logging.format
                );
            }
        }

        Ok(())
    }
}
