// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end: a real listener serving the registry, driven through
//! `RegistryClient`.

use agent_registry::client::RegistryClient;
use agent_registry::commands::load_config;
use agent_registry::server::build_app;
use agent_registry_core::domain::service_config::{ServiceConfig, StorageKind};
use serde_json::json;
use std::io::Write;
use tokio::net::TcpListener;

async fn spawn_server() -> RegistryClient {
    let app = build_app(&ServiceConfig::default()).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    RegistryClient::new(format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn test_client_round_trip() {
    let client = spawn_server().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(client.list_agents().await.unwrap().is_empty());

    let created = client
        .create_agent(&json!({
            "username": "jdoe",
            "fullName": "John Doe",
            "gender": "M",
            "email": "jdoe@example.com"
        }))
        .await
        .unwrap();
    assert_eq!(created.role_names(), vec!["ROLE_USER"]);

    let fetched = client
        .get_agent(created.user_id.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, created);

    let active = client.list_active_agents().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].username, "jdoe");

    assert!(client.delete_agent(created.user_id.as_str()).await.unwrap());
    assert!(!client.delete_agent(created.user_id.as_str()).await.unwrap());
    assert!(client.get_agent(created.user_id.as_str()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_client_surfaces_server_error_message() {
    let client = spawn_server().await;
    let payload = json!({
        "username": "jdoe",
        "fullName": "John Doe",
        "gender": "M",
        "email": "jdoe@example.com"
    });

    client.create_agent(&payload).await.unwrap();
    let err = client.create_agent(&payload).await.unwrap_err();
    assert!(err.to_string().contains("Username already exists: jdoe"));
}

#[test]
fn test_load_config_applies_flag_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "apiVersion: agent-registry/v1\nkind: ServiceConfig\nmetadata:\n  name: test\nspec:\n  server:\n    host: 0.0.0.0\n    port: 9000\n"
    )
    .unwrap();

    let config = load_config(Some(file.path().to_path_buf()), None, Some(9100)).unwrap();
    assert_eq!(config.metadata.name, "test");
    assert_eq!(config.spec.server.port, 9100);
    assert_eq!(config.spec.identifier.max_attempts, 32);
    if std::env::var("AGENT_REGISTRY_DATABASE_URL").is_err() {
        assert_eq!(config.spec.storage.backend, StorageKind::Memory);
    }
    if std::env::var("AGENT_REGISTRY_HOST").is_err() {
        assert_eq!(config.spec.server.host, "0.0.0.0");
    }
}
