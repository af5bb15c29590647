// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent commands against a running server
//!
//! Commands: list, active, show, create, remove

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use agent_registry_core::domain::agent::Agent;
use agent_registry_core::domain::service_config::ServiceConfig;

use crate::client::RegistryClient;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// List all agents
    List,

    /// List active agents
    Active,

    /// Show one agent as YAML
    Show {
        /// Agent ID
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Create an agent from a JSON or YAML file
    Create {
        /// Path to the agent payload
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove an agent
    Remove {
        /// Agent ID
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },
}

pub async fn handle_command(command: AgentCommand, config: &ServiceConfig) -> Result<()> {
    let client = RegistryClient::new(format!("http://{}", config.bind_address()))?;

    if let Err(e) = client.health().await {
        println!(
            "{}",
            format!("Agent registry is not reachable at {}", client.base_url()).red()
        );
        println!("Run 'agent-registry serve' to start the server.");
        return Err(e);
    }

    match command {
        AgentCommand::List => list_agents(client.list_agents().await?),
        AgentCommand::Active => list_agents(client.list_active_agents().await?),
        AgentCommand::Show { user_id } => show_agent(&user_id, &client).await,
        AgentCommand::Create { file } => create_agent(file, &client).await,
        AgentCommand::Remove { user_id } => remove_agent(&user_id, &client).await,
    }
}

fn list_agents(agents: Vec<Agent>) -> Result<()> {
    if agents.is_empty() {
        println!("{}", "No agents found".yellow());
        return Ok(());
    }

    println!("{} agents found:", agents.len());
    println!(
        "{:<9} {:<20} {:<30} {:<8} {}",
        "ID", "USERNAME", "EMAIL", "ACTIVE", "ROLES"
    );

    for agent in agents {
        println!(
            "{:<9} {:<20} {:<30} {:<8} {}",
            agent.user_id,
            agent.username.bold(),
            agent.email,
            agent.active,
            agent.role_names().join(",")
        );
    }

    Ok(())
}

async fn show_agent(user_id: &str, client: &RegistryClient) -> Result<()> {
    match client.get_agent(user_id).await? {
        Some(agent) => {
            let yaml = serde_yaml::to_string(&agent).context("Failed to render agent")?;
            println!("{}", yaml);
        }
        None => println!("{}", format!("Agent {} not found", user_id).yellow()),
    }
    Ok(())
}

async fn create_agent(file: PathBuf, client: &RegistryClient) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {:?}", file))?;

    // YAML is a superset of JSON
    let payload: serde_json::Value =
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", file))?;

    let agent = client.create_agent(&payload).await?;
    println!(
        "{}",
        format!("✓ Agent created: {} ({})", agent.user_id, agent.username).green()
    );
    Ok(())
}

async fn remove_agent(user_id: &str, client: &RegistryClient) -> Result<()> {
    if client.delete_agent(user_id).await? {
        println!("{}", format!("✓ Agent {} removed", user_id).green());
    } else {
        println!("{}", format!("Agent {} not found", user_id).yellow());
    }
    Ok(())
}
