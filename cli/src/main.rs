// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agent Registry CLI
//!
//! The `agent-registry` binary runs the registry HTTP server and offers a
//! few management commands around it.
//!
//! ## Commands
//!
//! - `agent-registry serve` - Run the HTTP server in the foreground
//! - `agent-registry config show|validate|generate` - Configuration management
//! - `agent-registry migrate [--dry-run]` - Apply PostgreSQL schema migrations
//! - `agent-registry agent list|active|show|create|remove` - Talk to a running server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use agent_registry::commands::{self, AgentCommand, ConfigCommand, MigrateCommand};
use agent_registry::server;

/// Agent Registry - CRUD service for agent records
#[derive(Parser)]
#[command(name = "agent-registry")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGENT_REGISTRY_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP host (overrides configuration)
    #[arg(long, global = true)]
    host: Option<String>,

    /// HTTP port (overrides configuration)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENT_REGISTRY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "AGENT_REGISTRY_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Apply database migrations
    #[command(name = "migrate")]
    Migrate {
        #[command(flatten)]
        command: MigrateCommand,
    },

    /// Agent records on a running server
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::Serve) => {
            let config = commands::load_config(cli.config, cli.host, cli.port)?;
            server::start_server(config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Migrate { command }) => {
            let config = commands::load_config(cli.config, cli.host, cli.port)?;
            commands::migrate::execute(command, &config).await
        }
        Some(Commands::Agent { command }) => {
            let config = commands::load_config(cli.config, cli.host, cli.port)?;
            commands::agent::handle_command(command, &config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
