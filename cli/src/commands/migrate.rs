// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Migrate Command
//!
//! Implements `agent-registry migrate`, which applies the schema migrations
//! embedded in `agent-registry-core`.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! agent-registry migrate
//!
//! # Preview migrations without applying
//! agent-registry migrate --dry-run
//! ```
//!
//! The database URL comes from `spec.storage.database_url` or
//! `AGENT_REGISTRY_DATABASE_URL`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use agent_registry_core::domain::service_config::{ServiceConfig, ENV_DATABASE_URL};
use agent_registry_core::infrastructure::db::{Database, MIGRATOR};

#[derive(Args)]
pub struct MigrateCommand {
    /// List pending migrations without applying them
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: MigrateCommand, config: &ServiceConfig) -> Result<()> {
    println!("{}", "Agent Registry Migrate".bold().green());

    let database_url = config
        .spec
        .storage
        .database_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .with_context(|| {
            format!(
                "No database URL configured. Set spec.storage.database_url or {}.",
                ENV_DATABASE_URL
            )
        })?;

    println!("Connecting to database...");
    let database = Database::new(database_url, 1)
        .await
        .context("Failed to connect to database")?;

    let applied = database.applied_migrations().await?;
    let pending: Vec<_> = MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    println!(
        "Migration status: {} applied, {} total available.",
        applied.len(),
        MIGRATOR.iter().count()
    );

    if pending.is_empty() {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations (dry run):");
        for migration in &pending {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying {} pending migration(s)...", pending.len());
    database
        .run_migrations()
        .await
        .context("Failed to apply migrations")?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}
