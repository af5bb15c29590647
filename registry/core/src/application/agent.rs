// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::agent::{Agent, AgentDraft, AgentId};
use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum AgentServiceError {
    /// Username or email already taken
    #[error("{0}")]
    Conflict(String),

    #[error("Agent not found with ID: {0}")]
    NotFound(AgentId),

    #[error("Could not allocate an unused agent identifier after {0} attempts")]
    IdentifierExhausted(u32),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AgentServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => AgentServiceError::Conflict(msg),
            other => AgentServiceError::Repository(other),
        }
    }
}

#[async_trait]
pub trait AgentService: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<Agent>, AgentServiceError>;
    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>, AgentServiceError>;
    async fn create_agent(&self, draft: AgentDraft) -> Result<Agent, AgentServiceError>;
    async fn update_agent(&self, id: &AgentId, draft: AgentDraft) -> Result<Agent, AgentServiceError>;
    async fn delete_agent(&self, id: &AgentId) -> Result<bool, AgentServiceError>;
    async fn list_active_agents(&self) -> Result<Vec<Agent>, AgentServiceError>;
}
