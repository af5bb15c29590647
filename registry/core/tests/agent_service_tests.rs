// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Behaviour of `StandardAgentService` against the in-memory repository.
//!
//! Covers the create defaults, uniqueness checks, identifier collision
//! retries, writers racing the service, the three role update modes and
//! cascading delete.

use agent_registry_core::application::{AgentService, AgentServiceError, StandardAgentService};
use agent_registry_core::domain::agent::{
    AddressDraft, Agent, AgentDraft, AgentId, InfoDraft, DEFAULT_ROLE,
};
use agent_registry_core::domain::identifier::{is_well_formed, IdentifierGenerator};
use agent_registry_core::domain::repository::{AgentRepository, RepositoryError, RoleSync};
use agent_registry_core::infrastructure::repositories::InMemoryAgentRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Hands out a fixed sequence of identifiers, repeating the last one.
struct ScriptedGenerator {
    ids: Mutex<VecDeque<&'static str>>,
}

impl ScriptedGenerator {
    fn new(ids: &[&'static str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().copied().collect()),
        }
    }
}

impl IdentifierGenerator for ScriptedGenerator {
    fn generate(&self) -> AgentId {
        let mut ids = self.ids.lock();
        let next = if ids.len() > 1 { ids.pop_front() } else { ids.front().copied() };
        AgentId::from(next.unwrap_or("Zz99999"))
    }
}

/// In-memory store that behaves as if another writer got in between the
/// service's read and its write.
#[derive(Default)]
struct RacingRepository {
    inner: InMemoryAgentRepository,
    /// `find_by_id` deletes the agent right after loading it
    delete_after_read: bool,
    /// `exists_by_id` always answers `false`
    stale_id_check: bool,
}

#[async_trait]
impl AgentRepository for RacingRepository {
    async fn insert(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        self.inner.insert(agent).await
    }

    async fn update(&self, agent: &Agent, roles: RoleSync) -> Result<Agent, RepositoryError> {
        self.inner.update(agent, roles).await
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let found = self.inner.find_by_id(id).await?;
        if self.delete_after_read {
            self.inner.delete(id).await?;
        }
        Ok(found)
    }

    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError> {
        self.inner.list_all().await
    }

    async fn find_by_active(&self, active: bool) -> Result<Vec<Agent>, RepositoryError> {
        self.inner.find_by_active(active).await
    }

    async fn exists_by_id(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        if self.stale_id_check {
            return Ok(false);
        }
        self.inner.exists_by_id(id).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        self.inner.exists_by_username(username).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        self.inner.exists_by_email(email).await
    }

    async fn delete(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        self.inner.delete(id).await
    }
}

fn draft(username: &str, email: &str) -> AgentDraft {
    AgentDraft::new(username, "John Doe", "M", email)
}

fn setup() -> (Arc<InMemoryAgentRepository>, StandardAgentService) {
    let repo = Arc::new(InMemoryAgentRepository::new());
    let service = StandardAgentService::new(repo.clone());
    (repo, service)
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let (_, service) = setup();

    let mut input = draft("jdoe", "jdoe@example.com");
    input.active = false;
    input.roles = Some(vec!["ROLE_ADMIN".into()]);
    let agent = service.create_agent(input).await.unwrap();

    assert!(is_well_formed(agent.user_id.as_str()));
    assert!(agent.active);
    assert_eq!(agent.last_login, None);
    assert_eq!(agent.role_names(), vec![DEFAULT_ROLE]);
    assert!(agent.roles[0].id.is_some());

    let info = agent.info.as_ref().unwrap();
    assert_eq!(info.status, "active");
    assert!(!info.admin_user && !info.email_pec_verified && !info.temporal_password);
    assert!(info.id.is_some());

    let address = agent.address.as_ref().unwrap();
    assert_eq!(address.zip_code, 0);
    assert_eq!(address.country, None);
}

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let (_, service) = setup();

    let mut input = draft("jdoe", "jdoe@example.com");
    input.email_pec = Some("jdoe@pec.example.com".into());
    input.date_of_birth = NaiveDate::from_ymd_opt(1990, 4, 12);
    input.address = Some(AddressDraft {
        country: Some("IT".into()),
        state: Some("RM".into()),
        address_line: Some("Via Roma 1".into()),
        zip_code: 100,
    });
    let created = service.create_agent(input).await.unwrap();

    let fetched = service.get_agent(&created.user_id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.email_pec.as_deref(), Some("jdoe@pec.example.com"));
    assert_eq!(fetched.address.unwrap().zip_code, 100);
}

#[tokio::test]
async fn test_create_rejects_duplicate_username_first() {
    let (repo, service) = setup();
    service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();

    let err = service
        .create_agent(draft("jdoe", "jdoe@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AgentServiceError::Conflict(msg) if msg == "Username already exists: jdoe"));

    let err = service
        .create_agent(draft("other", "jdoe@example.com"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, AgentServiceError::Conflict(msg) if msg == "Email already exists: jdoe@example.com")
    );

    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_retries_identifier_collisions() {
    let repo = Arc::new(InMemoryAgentRepository::new());
    let generator = Arc::new(ScriptedGenerator::new(&["Ab11111", "Ab11111", "Cd22222"]));
    let service = StandardAgentService::new(repo.clone()).with_generator(generator);

    let first = service.create_agent(draft("first", "first@x.com")).await.unwrap();
    let second = service.create_agent(draft("second", "second@x.com")).await.unwrap();

    assert_eq!(first.user_id.as_str(), "Ab11111");
    assert_eq!(second.user_id.as_str(), "Cd22222");
}

#[tokio::test]
async fn test_create_gives_up_after_max_attempts() {
    let repo = Arc::new(InMemoryAgentRepository::new());
    let generator = Arc::new(ScriptedGenerator::new(&["Ab11111"]));
    let service = StandardAgentService::new(repo.clone())
        .with_generator(generator)
        .with_max_id_attempts(3);

    service.create_agent(draft("first", "first@x.com")).await.unwrap();
    let err = service
        .create_agent(draft("second", "second@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentServiceError::IdentifierExhausted(3)));
    assert!(!repo.exists_by_username("second").await.unwrap());
}

#[tokio::test]
async fn test_create_never_overwrites_an_agent_with_the_same_id() {
    let repo = Arc::new(RacingRepository {
        stale_id_check: true,
        ..Default::default()
    });
    let generator = Arc::new(ScriptedGenerator::new(&["Ab11111", "Ab11111", "Cd22222"]));
    let service = StandardAgentService::new(repo.clone()).with_generator(generator);

    let alice = service.create_agent(draft("alice", "alice@x.com")).await.unwrap();
    let bob = service.create_agent(draft("bob", "bob@x.com")).await.unwrap();

    assert_eq!(alice.user_id.as_str(), "Ab11111");
    assert_eq!(bob.user_id.as_str(), "Cd22222");

    let stored = repo.list_all().await.unwrap();
    let usernames: Vec<_> = stored.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(usernames.len(), 2);
    assert!(usernames.contains(&"alice") && usernames.contains(&"bob"));
}

#[tokio::test]
async fn test_create_id_clashes_count_towards_max_attempts() {
    let repo = Arc::new(RacingRepository {
        stale_id_check: true,
        ..Default::default()
    });
    let generator = Arc::new(ScriptedGenerator::new(&["Ab11111"]));
    let service = StandardAgentService::new(repo.clone())
        .with_generator(generator)
        .with_max_id_attempts(3);

    service.create_agent(draft("alice", "alice@x.com")).await.unwrap();
    let err = service
        .create_agent(draft("bob", "bob@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentServiceError::IdentifierExhausted(3)));
    let alice = repo.find_by_id(&AgentId::from("Ab11111")).await.unwrap().unwrap();
    assert_eq!(alice.username, "alice");
}

#[tokio::test]
async fn test_update_racing_delete_is_not_found() {
    let repo = Arc::new(RacingRepository::default());
    let service = StandardAgentService::new(repo.clone());
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();

    let repo = Arc::new(RacingRepository {
        inner: repo.inner.clone(),
        delete_after_read: true,
        ..Default::default()
    });
    let service = StandardAgentService::new(repo.clone());

    let err = service
        .update_agent(&created.user_id, draft("johnny", "johnny@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(&err, AgentServiceError::NotFound(id) if *id == created.user_id));
    assert!(!repo.inner.exists_by_id(&created.user_id).await.unwrap());
    assert!(repo.inner.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_missing_agent_is_not_found() {
    let (repo, service) = setup();

    let err = service
        .update_agent(&AgentId::from("Xx12345"), draft("ghost", "ghost@x.com"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Agent not found with ID: Xx12345");
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_overwrites_fields_and_keeps_identity() {
    let (_, service) = setup();
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();

    let mut input = AgentDraft::new("johnny", "Johnny Doe", "M", "johnny@example.com");
    input.active = false;
    let updated = service.update_agent(&created.user_id, input).await.unwrap();

    assert_eq!(updated.user_id, created.user_id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.username, "johnny");
    assert_eq!(updated.full_name, "Johnny Doe");
    assert!(!updated.active);
    assert!(updated.last_login.is_some());
}

#[tokio::test]
async fn test_update_allows_keeping_own_username_and_email() {
    let (_, service) = setup();
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();

    let updated = service
        .update_agent(&created.user_id, draft("jdoe", "jdoe@example.com"))
        .await
        .unwrap();
    assert_eq!(updated.username, "jdoe");
}

#[tokio::test]
async fn test_update_rejects_taken_username_and_email() {
    let (_, service) = setup();
    service.create_agent(draft("alice", "alice@x.com")).await.unwrap();
    let bob = service.create_agent(draft("bob", "bob@x.com")).await.unwrap();

    let err = service
        .update_agent(&bob.user_id, draft("alice", "bob@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AgentServiceError::Conflict(msg) if msg.contains("alice")));

    let err = service
        .update_agent(&bob.user_id, draft("bob", "alice@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AgentServiceError::Conflict(msg) if msg.contains("alice@x.com")));
}

#[tokio::test]
async fn test_update_role_modes() {
    let (_, service) = setup();
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();
    let id = created.user_id.clone();

    // absent: untouched
    let updated = service.update_agent(&id, draft("jdoe", "jdoe@example.com")).await.unwrap();
    assert_eq!(updated.roles, created.roles);

    // non-empty: exactly the supplied set, fresh records
    let mut input = draft("jdoe", "jdoe@example.com");
    input.roles = Some(vec!["ROLE_ADMIN".into(), "ROLE_AUDITOR".into()]);
    let updated = service.update_agent(&id, input).await.unwrap();
    assert_eq!(updated.role_names(), vec!["ROLE_ADMIN", "ROLE_AUDITOR"]);
    assert!(updated.roles.iter().all(|r| r.id.is_some() && r.id != created.roles[0].id));

    // empty: cleared
    let mut input = draft("jdoe", "jdoe@example.com");
    input.roles = Some(vec![]);
    let updated = service.update_agent(&id, input).await.unwrap();
    assert!(updated.roles.is_empty());
    assert!(service.get_agent(&id).await.unwrap().unwrap().roles.is_empty());
}

#[tokio::test]
async fn test_update_overwrites_info_in_place() {
    let (_, service) = setup();
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();
    let info_id = created.info.as_ref().unwrap().id;

    let mut input = draft("jdoe", "jdoe@example.com");
    input.info = Some(InfoDraft {
        status: "suspended".into(),
        delete_date: None,
        admin_user: true,
        email_pec_verified: true,
        temporal_password: false,
    });
    let updated = service.update_agent(&created.user_id, input).await.unwrap();

    let info = updated.info.unwrap();
    assert_eq!(info.id, info_id);
    assert_eq!(info.status, "suspended");
    assert!(info.admin_user);
    assert_eq!(updated.address, created.address);
}

#[tokio::test]
async fn test_delete_cascades_and_reports_missing() {
    let (repo, service) = setup();
    let created = service.create_agent(draft("jdoe", "jdoe@example.com")).await.unwrap();

    assert!(service.delete_agent(&created.user_id).await.unwrap());
    assert!(service.get_agent(&created.user_id).await.unwrap().is_none());
    assert!(!repo.exists_by_email("jdoe@example.com").await.unwrap());

    assert!(!service.delete_agent(&created.user_id).await.unwrap());
}

#[tokio::test]
async fn test_list_active_filters_inactive_agents() {
    let (_, service) = setup();
    service.create_agent(draft("alice", "alice@x.com")).await.unwrap();
    let bob = service.create_agent(draft("bob", "bob@x.com")).await.unwrap();

    let mut input = draft("bob", "bob@x.com");
    input.active = false;
    service.update_agent(&bob.user_id, input).await.unwrap();

    let all = service.list_agents().await.unwrap();
    assert_eq!(all.len(), 2);

    let active = service.list_active_agents().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].username, "alice");
}
