// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state over an [`Agent`].

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use remora_agent::Agent;
use remora_config::model::GatewayConfig;
use remora_core::RemoraError;

pub mod handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Build the gateway router.
pub fn router(agent: Arc<Agent>) -> Router {
    let state = AppState {
        agent,
        start_time: Instant::now(),
    };

    Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/health", get(handlers::get_health))
        .route("/v1/sessions", get(handlers::get_sessions))
        .route("/v1/decision", get(handlers::get_decision))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(64))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server. Runs until the process exits.
pub async fn start_server(config: &GatewayConfig, agent: Arc<Agent>) -> Result<(), RemoraError> {
    let app = router(agent);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RemoraError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| RemoraError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use remora_config::model::RemoraConfig;
    use remora_memory::MemoryStore;
    use remora_test_utils::{FixedClock, MockProvider};

    async fn test_router() -> Router {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let agent = Agent::with_store(
            RemoraConfig::default(),
            store,
            Arc::new(MockProvider::with_responses(["hello from the gateway"])),
            Arc::new(FixedClock::default_instant()),
        )
        .await
        .unwrap();
        router(Arc::new(agent))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_provider() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["provider"], "mock");
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "any breaking news?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["reply"], "hello from the gateway");
        assert_eq!(json["category"], "news");
        assert!(json["session_id"].as_str().is_some());
        assert_eq!(json["decision"]["needs_refresh"], true);
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn decision_endpoint_is_read_only() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/decision?q=weather%20in%20paris")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["needs_refresh"], true);
        assert_eq!(json["category"], "weather");
    }

    #[tokio::test]
    async fn sessions_endpoint_lists_created_sessions() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let agent = Arc::new(
            Agent::with_store(
                RemoraConfig::default(),
                store,
                Arc::new(MockProvider::new()),
                Arc::new(FixedClock::default_instant()),
            )
            .await
            .unwrap(),
        );
        agent
            .chat(remora_agent::TurnRequest {
                session_id: None,
                channel: "api".to_string(),
                message: "hello".to_string(),
            })
            .await
            .unwrap();

        let app = router(agent);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["sessions"].as_array().unwrap().len(), 1);
        assert_eq!(json["sessions"][0]["channel"], "api");
    }
}
