// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent lifecycle use cases: create, read, update (merge) and delete.
//!
//! Uniqueness is checked in a fixed order, username before email, and
//! before any identifier is allocated. The repository re-checks both inside
//! its own transaction, so a racing writer still ends up with `Conflict`.
//! A racing create that claims the same identifier first sends this create
//! back to draw another one; a racing delete turns an update into `NotFound`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::agent::{AgentService, AgentServiceError};
use crate::domain::agent::{Agent, AgentDraft, AgentId};
use crate::domain::identifier::{IdentifierGenerator, SecureIdentifierGenerator};
use crate::domain::repository::{AgentRepository, RepositoryError, RoleSync};
use crate::domain::timestamp;

pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 32;

pub struct StandardAgentService {
    repository: Arc<dyn AgentRepository>,
    generator: Arc<dyn IdentifierGenerator>,
    max_id_attempts: u32,
}

impl StandardAgentService {
    pub fn new(repository: Arc<dyn AgentRepository>) -> Self {
        Self {
            repository,
            generator: Arc::new(SecureIdentifierGenerator::new()),
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn IdentifierGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    /// Draw identifiers until one is not yet stored. `attempts` counts draws
    /// across calls so the whole create stays within `max_id_attempts`.
    async fn allocate_id(&self, attempts: &mut u32) -> Result<AgentId, AgentServiceError> {
        while *attempts < self.max_id_attempts {
            *attempts += 1;
            let candidate = self.generator.generate();
            if !self.repository.exists_by_id(&candidate).await? {
                return Ok(candidate);
            }
            warn!(attempt = *attempts, candidate = %candidate, "Generated agent id already in use, retrying");
        }
        Err(AgentServiceError::IdentifierExhausted(self.max_id_attempts))
    }
}

#[async_trait]
impl AgentService for StandardAgentService {
    async fn list_agents(&self) -> Result<Vec<Agent>, AgentServiceError> {
        info!("Fetching all agents");
        Ok(self.repository.list_all().await?)
    }

    async fn get_agent(&self, id: &AgentId) -> Result<Option<Agent>, AgentServiceError> {
        info!(user_id = %id, "Fetching agent");
        Ok(self.repository.find_by_id(id).await?)
    }

    async fn create_agent(&self, draft: AgentDraft) -> Result<Agent, AgentServiceError> {
        info!(username = %draft.username, "Creating agent");

        if self.repository.exists_by_username(&draft.username).await? {
            return Err(AgentServiceError::Conflict(format!(
                "Username already exists: {}",
                draft.username
            )));
        }

        if self.repository.exists_by_email(&draft.email).await? {
            return Err(AgentServiceError::Conflict(format!(
                "Email already exists: {}",
                draft.email
            )));
        }

        let now = timestamp::now();
        let mut attempts = 0;
        loop {
            let user_id = self.allocate_id(&mut attempts).await?;
            let agent = Agent::register(user_id, draft.clone(), now);
            match self.repository.insert(&agent).await {
                Ok(saved) => {
                    info!(user_id = %saved.user_id, "Agent created");
                    return Ok(saved);
                }
                Err(RepositoryError::DuplicateId(taken)) => {
                    warn!(attempt = attempts, candidate = %taken, "Agent id claimed concurrently, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn update_agent(&self, id: &AgentId, draft: AgentDraft) -> Result<Agent, AgentServiceError> {
        info!(user_id = %id, "Updating agent");

        let mut agent = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AgentServiceError::NotFound(id.clone()))?;

        if agent.username != draft.username
            && self.repository.exists_by_username(&draft.username).await?
        {
            return Err(AgentServiceError::Conflict(format!(
                "Username already exists: {}",
                draft.username
            )));
        }

        if agent.email != draft.email && self.repository.exists_by_email(&draft.email).await? {
            return Err(AgentServiceError::Conflict(format!(
                "Email already exists: {}",
                draft.email
            )));
        }

        let previous_roles = agent.roles.len();
        let sync = agent.apply_update(draft, timestamp::now());
        if sync == RoleSync::Replace {
            info!(
                user_id = %id,
                removed = previous_roles,
                roles = %agent.role_names().join(", "),
                "Replacing agent roles"
            );
        }

        let saved = match self.repository.update(&agent, sync).await {
            Err(RepositoryError::NotFound(_)) => {
                warn!(user_id = %id, "Agent removed while updating");
                return Err(AgentServiceError::NotFound(id.clone()));
            }
            other => other?,
        };
        info!(user_id = %saved.user_id, "Agent updated");
        Ok(saved)
    }

    async fn delete_agent(&self, id: &AgentId) -> Result<bool, AgentServiceError> {
        info!(user_id = %id, "Deleting agent");

        let deleted = self.repository.delete(id).await?;
        if deleted {
            info!(user_id = %id, "Agent deleted");
        } else {
            warn!(user_id = %id, "Attempted to delete a non-existent agent");
        }
        Ok(deleted)
    }

    async fn list_active_agents(&self) -> Result<Vec<Agent>, AgentServiceError> {
        info!("Fetching active agents");
        Ok(self.repository.find_by_active(true).await?)
    }
}
