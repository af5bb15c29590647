// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the agent registry CLI

pub mod agent;
pub mod config;
pub mod migrate;

pub use self::agent::AgentCommand;
pub use self::config::ConfigCommand;
pub use self::migrate::MigrateCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;

use agent_registry_core::domain::service_config::ServiceConfig;

/// Load configuration (file or defaults, then environment) and apply the
/// `--host` / `--port` flags on top.
pub fn load_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load_or_default(path).context("Failed to load configuration")?;

    if let Some(host) = host {
        config.spec.server.host = host;
    }
    if let Some(port) = port {
        config.spec.server.port = port;
    }

    Ok(config)
}
