// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP control surface over the channel hub.
//!
//! Routes:
//! - `GET /health`: running flag and per-adapter status
//! - `POST /api/send`: send one message by composite conversation id
//! - `POST /api/broadcast`: send one message to many conversations
//!
//! Failed sends answer `400 Bad Request` with the same result body.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use switchboard_core::{MessageContent, SendOptions, SwitchboardError};
use switchboard_hub::{AdapterStatus, ChannelHub};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub hub: Arc<ChannelHub>,
    /// Instance name from `hub.name`.
    pub name: String,
}

/// Request body for `POST /api/send`.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub conversation_id: String,
    /// A tagged content object, or a bare string for text.
    pub content: serde_json::Value,
    #[serde(default)]
    pub options: SendOptions,
}

/// Request body for `POST /api/broadcast`.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub conversation_ids: Vec<String>,
    pub content: serde_json::Value,
    #[serde(default)]
    pub options: SendOptions,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub version: &'static str,
    pub running: bool,
    pub adapters: Vec<AdapterStatus>,
}

/// Build the router with permissive CORS.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/api/send", post(post_send))
        .route("/api/broadcast", post(post_broadcast))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let running = state.hub.is_running();
    Json(HealthResponse {
        status: if running { "ok" } else { "stopped" },
        name: state.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        running,
        adapters: state.hub.status(),
    })
}

/// POST /api/send
async fn post_send(State(state): State<ApiState>, Json(body): Json<SendRequest>) -> Response {
    let content = MessageContent::from_value(body.content);
    let result = state
        .hub
        .send(&body.conversation_id, content, body.options)
        .await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

/// POST /api/broadcast
async fn post_broadcast(
    State(state): State<ApiState>,
    Json(body): Json<BroadcastRequest>,
) -> Response {
    let content = MessageContent::from_value(body.content);
    let result = state
        .hub
        .broadcast(content, body.conversation_ids, body.options)
        .await;
    let status = if result.all_succeeded() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

/// Bind `addr` and serve until `cancel` fires.
pub async fn serve(
    addr: &str,
    state: ApiState,
    cancel: CancellationToken,
) -> Result<(), SwitchboardError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SwitchboardError::Channel {
            message: format!("failed to bind HTTP API to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!(%addr, "HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| SwitchboardError::Channel {
            message: format!("HTTP API error: {e}"),
            source: Some(Box::new(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use switchboard_core::PlatformType;
    use switchboard_test_utils::MockAdapter;
    use tower::ServiceExt;

    async fn make_app() -> (Router, Arc<MockAdapter>) {
        let hub = Arc::new(ChannelHub::new());
        let adapter = Arc::new(MockAdapter::new("telegram-main", PlatformType::Telegram));
        hub.register_adapter(adapter.clone()).await.unwrap();
        hub.start().await;
        let state = ApiState {
            hub,
            name: "test-hub".to_string(),
        };
        (router(state), adapter)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_lists_adapters() {
        let (app, _adapter) = make_app().await;
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["name"], "test-hub");
        assert_eq!(json["running"], true);
        assert_eq!(json["adapters"][0]["id"], "telegram-main");
        assert_eq!(json["adapters"][0]["state"], "connected");
    }

    #[tokio::test]
    async fn send_routes_through_hub() {
        let (app, adapter) = make_app().await;
        let resp = app
            .oneshot(post_json(
                "/api/send",
                serde_json::json!({
                    "conversation_id": "telegram:telegram-main:12345",
                    "content": { "type": "text", "text": "hello" },
                    "options": { "silent": true }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"]["conversation_id"], "telegram:telegram-main:12345");

        let calls = adapter.sent_calls().await;
        assert_eq!(calls[0].conversation_id, "12345");
        assert!(calls[0].options.silent);
    }

    #[tokio::test]
    async fn send_accepts_bare_string_content() {
        let (app, adapter) = make_app().await;
        let resp = app
            .oneshot(post_json(
                "/api/send",
                serde_json::json!({
                    "conversation_id": "telegram:telegram-main:1",
                    "content": "plain text"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            adapter.sent_calls().await[0].content,
            MessageContent::text("plain text")
        );
    }

    #[tokio::test]
    async fn failed_send_is_bad_request() {
        let (app, _adapter) = make_app().await;
        let resp = app
            .oneshot(post_json(
                "/api/send",
                serde_json::json!({
                    "conversation_id": "telegram:nobody:1",
                    "content": "hi"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "adapter not found: nobody");
    }

    #[tokio::test]
    async fn broadcast_reports_partial_failure() {
        let (app, adapter) = make_app().await;
        let resp = app
            .oneshot(post_json(
                "/api/broadcast",
                serde_json::json!({
                    "conversation_ids": ["telegram:telegram-main:1", "telegram:missing:2"],
                    "content": "news"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["total_sent"], 1);
        assert_eq!(json["failures"][0]["adapter_id"], "missing");
        assert_eq!(adapter.sent_count().await, 1);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (app, _adapter) = make_app().await;
        let resp = app
            .oneshot(post_json("/api/send", serde_json::json!({ "content": "hi" })))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
