// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/chat, GET /v1/health, GET /v1/sessions, and the
//! GET /v1/decision debug view of the freshness verdict.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use remora_agent::TurnRequest;
use remora_core::{HealthStatus, RemoraError};
use remora_freshness::Decision;

use crate::AppState;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Message text.
    pub message: String,
    /// Optional session ID to continue an existing session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub category: String,
    pub topic: String,
    /// Freshness verdict, absent for personal-fact queries.
    pub decision: Option<Decision>,
    /// Attributes of personal facts stored this turn.
    pub facts_stored: Vec<String>,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Response body for GET /v1/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response body for GET /v1/sessions.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: String,
    pub channel: String,
    pub state: String,
    pub created_at: String,
}

/// Query string for GET /v1/decision.
#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    pub q: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(err: RemoraError) -> Response {
    error!(%err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// POST /v1/chat
pub async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    if body.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let request = TurnRequest {
        session_id: body.session_id,
        channel: "api".to_string(),
        message: body.message,
    };

    match state.agent.chat(request).await {
        Ok(outcome) => Json(ChatResponse {
            session_id: outcome.session_id,
            reply: outcome.reply,
            category: outcome.category.to_string(),
            topic: outcome.topic,
            decision: outcome.decision,
            facts_stored: outcome.facts_stored,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .into_response(),
        Err(err) => internal_error(err),
    }
}

/// GET /v1/health
pub async fn get_health(State(state): State<AppState>) -> Response {
    let provider_health = match state.agent.provider_health().await {
        Ok(health) => health,
        Err(err) => return internal_error(err),
    };
    let status = match provider_health {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    };
    Json(HealthResponse {
        status,
        provider: state.agent.provider_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
    .into_response()
}

/// GET /v1/sessions
pub async fn get_sessions(State(state): State<AppState>) -> Response {
    use remora_core::traits::StorageAdapter;

    match state.agent.storage().list_sessions(None).await {
        Ok(sessions) => Json(SessionListResponse {
            sessions: sessions
                .into_iter()
                .map(|s| SessionInfo {
                    id: s.id,
                    channel: s.channel,
                    state: s.state,
                    created_at: s.created_at,
                })
                .collect(),
        })
        .into_response(),
        Err(err) => internal_error(err),
    }
}

/// GET /v1/decision?q=
///
/// Debug view: runs the freshness decision for a query without persisting
/// anything.
pub async fn get_decision(
    State(state): State<AppState>,
    Query(query): Query<DecisionQuery>,
) -> Response {
    match state.agent.peek_decision(&query.q).await {
        Ok(decision) => Json(decision).into_response(),
        Err(err) => internal_error(err),
    }
}
