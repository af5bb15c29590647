// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::application::agent::AgentServiceError;

/// HTTP-facing error. Client errors carry their message verbatim, internal
/// errors are logged and replaced with a generic body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal,
}

impl From<AgentServiceError> for ApiError {
    fn from(err: AgentServiceError) -> Self {
        match err {
            AgentServiceError::Conflict(msg) => ApiError::BadRequest(msg),
            AgentServiceError::NotFound(_) => ApiError::NotFound,
            other => {
                error!(error = %other, "Agent operation failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}
