// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for a running agent registry server

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use agent_registry_core::domain::agent::Agent;

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .with_context(|| format!("Failed to reach server at {}", self.base_url))?;

        if !response.status().is_success() {
            anyhow::bail!("Health check failed: HTTP {}", response.status());
        }

        response.json().await.context("Failed to parse health response")
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_list("/api/v1/agents").await
    }

    pub async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        self.get_list("/api/v1/agents/active").await
    }

    async fn get_list(&self, path: &str) -> Result<Vec<Agent>> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .context("Failed to list agents")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to list agents: {}", error_text(response).await);
        }

        response.json().await.context("Failed to parse agent list")
    }

    /// `None` when the server has no agent with this id.
    pub async fn get_agent(&self, user_id: &str) -> Result<Option<Agent>> {
        let response = self
            .client
            .get(format!("{}/api/v1/{}", self.base_url, user_id))
            .send()
            .await
            .context("Failed to get agent")?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(
                response.json().await.context("Failed to parse agent")?,
            )),
            _ => anyhow::bail!("Failed to get agent: {}", error_text(response).await),
        }
    }

    pub async fn create_agent(&self, payload: &serde_json::Value) -> Result<Agent> {
        let response = self
            .client
            .post(format!("{}/api/v1/agent", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to create agent")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to create agent: {}", error_text(response).await);
        }

        response.json().await.context("Failed to parse created agent")
    }

    /// `false` when the server has no agent with this id.
    pub async fn delete_agent(&self, user_id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(format!("{}/api/v1/{}", self.base_url, user_id))
            .send()
            .await
            .context("Failed to delete agent")?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => anyhow::bail!("Failed to delete agent: {}", error_text(response).await),
        }
    }
}

/// Server error message from a failed response, falling back to the status.
async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.is_empty() => format!("HTTP {}", status),
        Err(_) => body,
    }
}
