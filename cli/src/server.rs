// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server bootstrap: configuration, storage wiring, listener and
//! graceful shutdown.

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use agent_registry_core::{
    application::{repository_factory::create_agent_repository, StandardAgentService},
    domain::service_config::ServiceConfig,
    presentation::api,
};

/// Wire repository, service and router for `config`.
pub async fn build_app(config: &ServiceConfig) -> Result<Router> {
    let repository = create_agent_repository(&config.storage_backend())
        .await
        .context("Failed to initialize agent repository")?;

    let service = StandardAgentService::new(repository)
        .with_max_id_attempts(config.spec.identifier.max_attempts);

    Ok(api::app(Arc::new(service)))
}

pub async fn start_server(config: ServiceConfig) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        name = %config.metadata.name,
        storage = ?config.spec.storage.backend,
        "Agent registry starting"
    );

    let app = build_app(&config).await?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Agent registry shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
