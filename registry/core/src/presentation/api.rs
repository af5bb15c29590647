// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::agent::AgentService;
use crate::domain::agent::{Agent, AgentId};
use crate::presentation::dto::AgentRequest;
use crate::presentation::error::ApiError;

const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

pub struct AppState {
    pub agent_service: Arc<dyn AgentService>,
    pub start_time: Instant,
}

pub fn app(service: Arc<dyn AgentService>) -> Router {
    let state = Arc::new(AppState {
        agent_service: service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/agents", get(list_agents))
        .route("/api/v1/agents/active", get(list_active_agents))
        .route("/api/v1/agent", post(create_agent))
        .route(
            "/api/v1/{user_id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<T, ApiError>;

fn body(payload: Result<Json<AgentRequest>, JsonRejection>) -> ApiResult<AgentRequest> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.agent_service.list_agents().await?))
}

async fn list_active_agents(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.agent_service.list_active_agents().await?))
}

async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Agent>> {
    state
        .agent_service
        .get_agent(&AgentId(user_id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Agent>)> {
    let draft = body(payload)?.validate().map_err(ApiError::BadRequest)?;
    let agent = state.agent_service.create_agent(draft).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn update_agent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> ApiResult<Json<Agent>> {
    let draft = body(payload)?.validate().map_err(ApiError::BadRequest)?;
    let agent = state
        .agent_service
        .update_agent(&AgentId(user_id), draft)
        .await?;
    Ok(Json(agent))
}

async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.agent_service.delete_agent(&AgentId(user_id)).await? {
        Ok(Json(json!({ "message": "Agent deleted successfully" })))
    } else {
        Err(ApiError::NotFound)
    }
}
