// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the `AgentRepository` abstraction
//! defined in the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve agent aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **PostgresAgentRepository** - production storage across the `agents`,
//!   `roles`, `user_info` and `user_address` tables
//! - **InMemoryAgentRepository** - lock-protected map for development and tests
//!
//! Both enforce username/email uniqueness and write each aggregate
//! atomically.

pub mod postgres_agent;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::repository::{AgentRepository, RepositoryError, RoleSync};

#[derive(Default)]
struct InMemoryState {
    agents: HashMap<AgentId, Agent>,
    role_seq: i64,
    info_seq: i64,
    address_seq: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Clone, Default)]
pub struct InMemoryAgentRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut agents: Vec<Agent>) -> Vec<Agent> {
    agents.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    agents
}

impl InMemoryState {
    fn check_unique(&self, agent: &Agent) -> Result<(), RepositoryError> {
        let taken = |matches: &dyn Fn(&Agent) -> bool| {
            self.agents
                .values()
                .any(|other| other.user_id != agent.user_id && matches(other))
        };
        if taken(&|other| other.username == agent.username) {
            return Err(RepositoryError::Conflict(format!(
                "Username already exists: {}",
                agent.username
            )));
        }
        if taken(&|other| other.email == agent.email) {
            return Err(RepositoryError::Conflict(format!(
                "Email already exists: {}",
                agent.email
            )));
        }
        Ok(())
    }

    /// Build the stored form of `agent`, reusing child ids from `previous`.
    fn stage(&mut self, agent: &Agent, previous: Option<&Agent>, roles: RoleSync) -> Agent {
        let mut stored = agent.clone();

        if let Some(prev) = previous {
            stored.created_at = prev.created_at;
        }

        match roles {
            RoleSync::Retain => {
                stored.roles = previous.map(|p| p.roles.clone()).unwrap_or_default();
            }
            RoleSync::Replace => {
                for role in stored.roles.iter_mut() {
                    role.id = Some(next(&mut self.role_seq));
                }
            }
        }

        match stored.info.as_mut() {
            Some(info) => {
                let existing = previous.and_then(|p| p.info.as_ref()).and_then(|i| i.id);
                info.id = match info.id.or(existing) {
                    Some(id) => Some(id),
                    None => Some(next(&mut self.info_seq)),
                };
            }
            None => stored.info = previous.and_then(|p| p.info.clone()),
        }

        match stored.address.as_mut() {
            Some(address) => {
                let existing = previous.and_then(|p| p.address.as_ref()).and_then(|a| a.id);
                address.id = match address.id.or(existing) {
                    Some(id) => Some(id),
                    None => Some(next(&mut self.address_seq)),
                };
            }
            None => stored.address = previous.and_then(|p| p.address.clone()),
        }

        stored
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn insert(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        let mut state = self.state.write();

        if state.agents.contains_key(&agent.user_id) {
            return Err(RepositoryError::DuplicateId(agent.user_id.clone()));
        }
        state.check_unique(agent)?;

        let mut fresh = agent.clone();
        if let Some(info) = fresh.info.as_mut() {
            info.id = None;
        }
        if let Some(address) = fresh.address.as_mut() {
            address.id = None;
        }
        let stored = state.stage(&fresh, None, RoleSync::Replace);
        state.agents.insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, agent: &Agent, roles: RoleSync) -> Result<Agent, RepositoryError> {
        let mut state = self.state.write();

        let previous = state
            .agents
            .get(&agent.user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(agent.user_id.to_string()))?;
        state.check_unique(agent)?;

        let stored = state.stage(agent, Some(&previous), roles);
        state.agents.insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        Ok(self.state.read().agents.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError> {
        Ok(sorted(self.state.read().agents.values().cloned().collect()))
    }

    async fn find_by_active(&self, active: bool) -> Result<Vec<Agent>, RepositoryError> {
        let state = self.state.read();
        let agents = state
            .agents
            .values()
            .filter(|a| a.active == active)
            .map(|a| Agent {
                roles: Vec::new(),
                info: None,
                address: None,
                ..a.clone()
            })
            .collect();
        Ok(sorted(agents))
    }

    async fn exists_by_id(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        Ok(self.state.read().agents.contains_key(id))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        Ok(self.state.read().agents.values().any(|a| a.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.state.read().agents.values().any(|a| a.email == email))
    }

    async fn delete(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        Ok(self.state.write().agents.remove(id).is_some())
    }
}
