// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the configuration schema for an agent registry instance:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP listener settings
// - Storage backend selection (in-memory or PostgreSQL)
// - Identifier allocation limits

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "agent-registry/v1";
pub const KIND: &str = "ServiceConfig";

pub const ENV_CONFIG_PATH: &str = "AGENT_REGISTRY_CONFIG_PATH";
pub const ENV_DATABASE_URL: &str = "AGENT_REGISTRY_DATABASE_URL";
pub const ENV_HOST: &str = "AGENT_REGISTRY_HOST";
pub const ENV_PORT: &str = "AGENT_REGISTRY_PORT";

/// Top-level Kubernetes-style service configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfigManifest {
    /// API version (must be "agent-registry/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ServiceConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: ServiceConfigSpec,
}

pub type ServiceConfig = ServiceConfigManifest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable instance name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub identifier: IdentifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_kind")]
    pub backend: StorageKind,

    /// PostgreSQL connection URL (required for the postgres backend)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply embedded migrations when the server starts
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Upper bound on collision retries when allocating a new agent id
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Memory
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    32
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_kind(),
            database_url: None,
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ServiceConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "agent-registry".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
            },
            spec: ServiceConfigSpec::default(),
        }
    }
}

impl ServiceConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Paths checked by `discover_config`, in precedence order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./agent-registry.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".agent-registry").join("config.yaml"));
        }
        paths.push(PathBuf::from("/etc/agent-registry/config.yaml"));
        paths
    }

    /// Discover configuration file using precedence order
    /// 1. AGENT_REGISTRY_CONFIG_PATH environment variable
    /// 2. ./agent-registry.yaml (working directory)
    /// 3. ~/.agent-registry/config.yaml (user home)
    /// 4. /etc/agent-registry/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
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
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
            if !url.trim().is_empty() {
                tracing::info!("Environment override: {} set, using postgres backend", ENV_DATABASE_URL);
                self.spec.storage.backend = StorageKind::Postgres;
                self.spec.storage.database_url = Some(url);
            }
        }

        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.trim().is_empty() {
                tracing::info!("Environment override: {}={}", ENV_HOST, host);
                self.spec.server.host = host;
            }
        }

        if let Ok(val) = std::env::var(ENV_PORT) {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: {}={}", ENV_PORT, port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for {}: '{}'. Expected a port number. Ignoring.",
                        ENV_PORT,
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
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

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        if self.spec.storage.max_connections == 0 {
            anyhow::bail!("spec.storage.max_connections must be at least 1");
        }

        if self.spec.storage.backend == StorageKind::Postgres
            && self
                .spec
                .storage
                .database_url
                .as_deref()
                .map_or(true, |url| url.trim().is_empty())
        {
            anyhow::bail!("spec.storage.database_url is required for the postgres backend");
        }

        if self.spec.identifier.max_attempts == 0 {
            anyhow::bail!("spec.identifier.max_attempts must be at least 1");
        }

        Ok(())
    }

    /// Resolve the storage section into a repository backend selector.
    pub fn storage_backend(&self) -> StorageBackend {
        let storage = &self.spec.storage;
        match (storage.backend, storage.database_url.as_ref()) {
            (StorageKind::Postgres, Some(url)) => StorageBackend::PostgreSQL(PostgresConfig {
                connection_string: url.clone(),
                max_connections: storage.max_connections,
                run_migrations: storage.run_migrations,
            }),
            _ => StorageBackend::InMemory,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.spec.server.host, self.spec.server.port)
    }
}
