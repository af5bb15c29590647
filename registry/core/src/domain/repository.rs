// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interface
//!
//! Persistence contract for the `Agent` aggregate, following the DDD
//! Repository pattern: one repository per aggregate root, interface defined
//! in the domain layer, implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `AgentRepository` | `Agent` (+ `Role`, `AgentInfo`, `AgentAddress`) | `InMemoryAgentRepository`, `PostgresAgentRepository` |
//!
//! ## Unit of work
//!
//! `insert`, `update` and `delete` write the agent row and all of its child
//! rows as one atomic unit. Implementations must also enforce username and
//! email uniqueness themselves and report violations as
//! `RepositoryError::Conflict`.
//!
//! `insert` never overwrites: an identifier that is already stored fails with
//! `RepositoryError::DuplicateId`. `update` never creates: an identifier that
//! is no longer stored fails with `RepositoryError::NotFound`.

use async_trait::async_trait;

use crate::domain::agent::{Agent, AgentId};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// How `update` treats the roles already stored for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSync {
    /// Leave stored roles untouched; the aggregate's role list is ignored.
    Retain,
    /// Delete every stored role of the agent, then insert the aggregate's
    /// roles as new records.
    Replace,
}

/// Repository interface for Agent aggregates
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Store a new aggregate and return it as stored, with child identifiers
    /// assigned.
    async fn insert(&self, agent: &Agent) -> Result<Agent, RepositoryError>;

    /// Overwrite an existing aggregate and return it as stored. `created_at`
    /// keeps its stored value.
    async fn update(&self, agent: &Agent, roles: RoleSync) -> Result<Agent, RepositoryError>;

    /// Find agent by ID with roles, info and address loaded
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError>;

    /// List all agents with roles, info and address loaded
    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError>;

    /// List agents by active flag. Child records are not loaded.
    async fn find_by_active(&self, active: bool) -> Result<Vec<Agent>, RepositoryError>;

    async fn exists_by_id(&self, id: &AgentId) -> Result<bool, RepositoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Delete the agent and every child record. Returns `false` when there
    /// was nothing to delete.
    async fn delete(&self, id: &AgentId) -> Result<bool, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Agent id already in use: {0}")]
    DuplicateId(AgentId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
