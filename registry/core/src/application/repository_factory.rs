// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates the concrete `AgentRepository` for the configured storage backend,
//! keeping the domain layer free of infrastructure dependencies.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Select and wire the persistence implementation

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::repository::{AgentRepository, StorageBackend};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_agent::PostgresAgentRepository;
use crate::infrastructure::repositories::InMemoryAgentRepository;

/// Creates an AgentRepository implementation based on the configured backend.
///
/// For PostgreSQL this opens the pool and, when enabled, applies pending
/// migrations before handing the repository out.
pub async fn create_agent_repository(backend: &StorageBackend) -> Result<Arc<dyn AgentRepository>> {
    match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory agent repository");
            Ok(Arc::new(InMemoryAgentRepository::new()))
        }
        StorageBackend::PostgreSQL(config) => {
            let database = Database::new(&config.connection_string, config.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;

            if config.run_migrations {
                database
                    .run_migrations()
                    .await
                    .context("Failed to apply database migrations")?;
            }

            info!("Using PostgreSQL agent repository");
            Ok(Arc::new(PostgresAgentRepository::new(database.get_pool().clone())))
        }
    }
}
