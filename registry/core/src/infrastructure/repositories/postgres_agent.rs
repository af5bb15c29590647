// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Agent Repository
//!
//! Production `AgentRepository` implementation backed by PostgreSQL via
//! `sqlx`. Translates between the `Agent` aggregate and the `agents`,
//! `roles`, `user_info` and `user_address` tables.
//!
//! Every write runs inside a single transaction. `update` and `delete` both
//! lock the `agents` row before touching child rows. Child rows are loaded
//! with one `= ANY($1)` query per table and stitched onto their owners.

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgRow};
use sqlx::Row;
use std::collections::HashMap;

use crate::domain::agent::{Agent, AgentAddress, AgentId, AgentInfo, Role};
use crate::domain::repository::{AgentRepository, RepositoryError, RoleSync};

const PRIMARY_KEY: &str = "agents_pkey";

const SELECT_AGENTS: &str = r#"
    SELECT
        user_id, username, full_name, gender, email, email_pec,
        date_of_birth, last_login, created_at, active
    FROM agents
"#;

pub struct PostgresAgentRepository {
    pool: PgPool,
}

impl PostgresAgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn agent_from_row(row: &PgRow) -> Result<Agent, sqlx::Error> {
    Ok(Agent {
        user_id: AgentId(row.try_get("user_id")?),
        username: row.try_get("username")?,
        full_name: row.try_get("full_name")?,
        gender: row.try_get("gender")?,
        email: row.try_get("email")?,
        email_pec: row.try_get("email_pec")?,
        date_of_birth: row.try_get("date_of_birth")?,
        last_login: row.try_get("last_login")?,
        created_at: row.try_get("created_at")?,
        active: row.try_get("active")?,
        roles: Vec::new(),
        info: None,
        address: None,
    })
}

/// Load roles, info and address for every agent in `agents`.
async fn attach_children(conn: &mut PgConnection, agents: &mut [Agent]) -> Result<(), sqlx::Error> {
    if agents.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = agents.iter().map(|a| a.user_id.0.clone()).collect();

    let mut roles: HashMap<String, Vec<Role>> = HashMap::new();
    let rows = sqlx::query(
        "SELECT id, name, agent_user_id FROM roles WHERE agent_user_id = ANY($1) ORDER BY id",
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;
    for row in rows {
        roles
            .entry(row.try_get("agent_user_id")?)
            .or_default()
            .push(Role {
                id: Some(row.try_get("id")?),
                name: row.try_get("name")?,
            });
    }

    let mut infos: HashMap<String, AgentInfo> = HashMap::new();
    let rows = sqlx::query(
        r#"
        SELECT id, status, delete_date, admin_user, email_pec_verified,
               temporal_password, agent_user_id
        FROM user_info
        WHERE agent_user_id = ANY($1)
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;
    for row in rows {
        infos.insert(
            row.try_get("agent_user_id")?,
            AgentInfo {
                id: Some(row.try_get("id")?),
                status: row.try_get("status")?,
                delete_date: row.try_get("delete_date")?,
                admin_user: row.try_get("admin_user")?,
                email_pec_verified: row.try_get("email_pec_verified")?,
                temporal_password: row.try_get("temporal_password")?,
            },
        );
    }

    let mut addresses: HashMap<String, AgentAddress> = HashMap::new();
    let rows = sqlx::query(
        r#"
        SELECT id, country, state, address_line, zip_code, agent_user_id
        FROM user_address
        WHERE agent_user_id = ANY($1)
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;
    for row in rows {
        addresses.insert(
            row.try_get("agent_user_id")?,
            AgentAddress {
                id: Some(row.try_get("id")?),
                country: row.try_get("country")?,
                state: row.try_get("state")?,
                address_line: row.try_get("address_line")?,
                zip_code: row.try_get("zip_code")?,
            },
        );
    }

    for agent in agents.iter_mut() {
        let key = agent.user_id.as_str();
        agent.roles = roles.remove(key).unwrap_or_default();
        agent.info = infos.remove(key);
        agent.address = addresses.remove(key);
    }

    Ok(())
}

/// Translate unique-constraint violations on `agents` into `Conflict` or
/// `DuplicateId`.
fn map_write_error(err: sqlx::Error, agent: &Agent) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint == PRIMARY_KEY {
                return RepositoryError::DuplicateId(agent.user_id.clone());
            }
            if constraint.contains("username") {
                return RepositoryError::Conflict(format!(
                    "Username already exists: {}",
                    agent.username
                ));
            }
            if constraint.contains("email") {
                return RepositoryError::Conflict(format!(
                    "Email already exists: {}",
                    agent.email
                ));
            }
        }
    }
    RepositoryError::from(err)
}

/// Write roles (per `roles`), info and address rows for an agent whose
/// `agents` row is already in place.
async fn write_children(
    conn: &mut PgConnection,
    agent: &Agent,
    roles: RoleSync,
) -> Result<(), sqlx::Error> {
    if roles == RoleSync::Replace {
        sqlx::query("DELETE FROM roles WHERE agent_user_id = $1")
            .bind(agent.user_id.as_str())
            .execute(&mut *conn)
            .await?;

        for role in &agent.roles {
            sqlx::query("INSERT INTO roles (name, agent_user_id) VALUES ($1, $2)")
                .bind(&role.name)
                .bind(agent.user_id.as_str())
                .execute(&mut *conn)
                .await?;
        }
    }

    if let Some(info) = &agent.info {
        sqlx::query(
            r#"
            INSERT INTO user_info (
                status, delete_date, admin_user, email_pec_verified,
                temporal_password, agent_user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (agent_user_id) DO UPDATE SET
                status = EXCLUDED.status,
                delete_date = EXCLUDED.delete_date,
                admin_user = EXCLUDED.admin_user,
                email_pec_verified = EXCLUDED.email_pec_verified,
                temporal_password = EXCLUDED.temporal_password
            "#,
        )
        .bind(&info.status)
        .bind(info.delete_date)
        .bind(info.admin_user)
        .bind(info.email_pec_verified)
        .bind(info.temporal_password)
        .bind(agent.user_id.as_str())
        .execute(&mut *conn)
        .await?;
    }

    if let Some(address) = &agent.address {
        sqlx::query(
            r#"
            INSERT INTO user_address (
                country, state, address_line, zip_code, agent_user_id
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (agent_user_id) DO UPDATE SET
                country = EXCLUDED.country,
                state = EXCLUDED.state,
                address_line = EXCLUDED.address_line,
                zip_code = EXCLUDED.zip_code
            "#,
        )
        .bind(&address.country)
        .bind(&address.state)
        .bind(&address.address_line)
        .bind(address.zip_code)
        .bind(agent.user_id.as_str())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn load_one(conn: &mut PgConnection, id: &AgentId) -> Result<Option<Agent>, sqlx::Error> {
    let row = sqlx::query(&format!("{SELECT_AGENTS} WHERE user_id = $1"))
        .bind(id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let mut found = vec![agent_from_row(&row)?];
            attach_children(&mut *conn, &mut found).await?;
            Ok(found.pop())
        }
        None => Ok(None),
    }
}

#[async_trait]
impl AgentRepository for PostgresAgentRepository {
    async fn insert(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO agents (
                user_id, username, full_name, gender, email, email_pec,
                date_of_birth, last_login, created_at, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(agent.user_id.as_str())
        .bind(&agent.username)
        .bind(&agent.full_name)
        .bind(&agent.gender)
        .bind(&agent.email)
        .bind(&agent.email_pec)
        .bind(agent.date_of_birth)
        .bind(agent.last_login)
        .bind(agent.created_at)
        .bind(agent.active)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, agent))?;

        write_children(&mut *tx, agent, RoleSync::Replace).await?;
        let stored = load_one(&mut *tx, &agent.user_id).await?;

        tx.commit().await?;

        stored.ok_or_else(|| RepositoryError::NotFound(agent.user_id.to_string()))
    }

    async fn update(&self, agent: &Agent, roles: RoleSync) -> Result<Agent, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE agents SET
                username = $2,
                full_name = $3,
                gender = $4,
                email = $5,
                email_pec = $6,
                date_of_birth = $7,
                last_login = $8,
                active = $9
            WHERE user_id = $1
            "#,
        )
        .bind(agent.user_id.as_str())
        .bind(&agent.username)
        .bind(&agent.full_name)
        .bind(&agent.gender)
        .bind(&agent.email)
        .bind(&agent.email_pec)
        .bind(agent.date_of_birth)
        .bind(agent.last_login)
        .bind(agent.active)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, agent))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(agent.user_id.to_string()));
        }

        write_children(&mut *tx, agent, roles).await?;
        let stored = load_one(&mut *tx, &agent.user_id).await?;

        tx.commit().await?;

        stored.ok_or_else(|| RepositoryError::NotFound(agent.user_id.to_string()))
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Ok(load_one(&mut *conn, id).await?)
    }

    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(&format!("{SELECT_AGENTS} ORDER BY created_at, user_id"))
            .fetch_all(&mut *conn)
            .await?;

        let mut agents = rows
            .iter()
            .map(agent_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        attach_children(&mut *conn, &mut agents).await?;

        Ok(agents)
    }

    async fn find_by_active(&self, active: bool) -> Result<Vec<Agent>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_AGENTS} WHERE active = $1 ORDER BY created_at, user_id"
        ))
        .bind(active)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(agent_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn exists_by_id(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM agents WHERE user_id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM agents WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM agents WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn delete(&self, id: &AgentId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT user_id FROM agents WHERE user_id = $1 FOR UPDATE")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM roles WHERE agent_user_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_info WHERE agent_user_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_address WHERE agent_user_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM agents WHERE user_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
