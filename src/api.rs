//! HTTP surface for the conversation graph
//!
//! One chat endpoint over the orchestrator plus a health probe. Inbound
//! messages are loosely shaped JSON; content is read through
//! [`extract_text`] so strings, message objects, and odd client payloads
//! all work.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::agent::Orchestrator;
use crate::models::{ConversationState, Message, Role};
use crate::text::extract_text;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub run_id: String,
    pub answer: String,
    pub transcript: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let messages: Vec<Message> = request.messages.iter().map(parse_message).collect();

    if messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("messages must not be empty".to_string())),
        );
    }

    let seeded = ConversationState::from_messages(messages);
    info!(run_id = %seeded.run_id, "chat request received");

    match state.orchestrator.run_state(seeded).await {
        Ok(final_state) => {
            let response = ChatResponse {
                run_id: final_state.run_id.to_string(),
                answer: final_state.final_answer().unwrap_or_default().to_string(),
                transcript: final_state.messages,
            };
            (StatusCode::OK, Json(ApiResponse::success(response)))
        }
        Err(e) => {
            error!(error = %e, "graph run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Graph run failed: {}", e))),
            )
        }
    }
}

/// Read one loosely-shaped inbound message. Unknown or missing roles
/// default to user.
fn parse_message(raw: &Value) -> Message {
    let role = match raw.get("role").and_then(Value::as_str) {
        Some("assistant") => Role::Assistant,
        Some("tool") => Role::Tool,
        Some("system") => Role::System,
        _ => Role::User,
    };

    Message::new(role, extract_text(raw))
}

/// =============================
/// Router & Server Startup
/// =============================

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(
    orchestrator: Arc<Orchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
