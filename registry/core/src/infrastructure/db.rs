// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that is
//! injected into the PostgreSQL repository, and carries the embedded schema
//! migrations (`registry/core/migrations`).

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// SQLSTATE for a relation that does not exist
const UNDEFINED_TABLE: &str = "42P01";

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Applying database migrations");
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Versions already recorded in `_sqlx_migrations`; empty when the table
    /// does not exist yet.
    pub async fn applied_migrations(&self) -> Result<Vec<i64>> {
        let versions =
            sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations ORDER BY version")
                .fetch_all(&self.pool)
                .await;

        match versions {
            Ok(versions) => Ok(versions),
            Err(err) if is_undefined_table(&err) => Ok(Vec::new()),
            Err(err) => Err(err).context("Failed to read applied migrations"),
        }
    }
}

fn is_undefined_table(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_TABLE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_table_counts_as_unmigrated() {
        assert!(!is_undefined_table(&sqlx::Error::PoolClosed));
        assert!(!is_undefined_table(&sqlx::Error::RowNotFound));
    }
}
