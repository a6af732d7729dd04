//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/conversations               - List stored conversation ids
//! - POST /api/v1/conversations/{id}/messages - Submit a message, get the exchange
//! - GET  /api/v1/conversations/{id}/messages - Full turn history

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use dobi_types::chat::{ChatExchange, ConversationId, Turn};
use dobi_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub text: String,
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ConversationId>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let ids = state.orchestrator.history().list().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(ids, request_id, elapsed)))
}

/// POST /api/v1/conversations/{id}/messages
///
/// Model and search failures do not produce an HTTP error: the exchange
/// comes back with `failed = true` and an apology as the answer.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<ChatExchange>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = ConversationId::new(id)?;
    if body.text.trim().is_empty() {
        return Err(ChatError::EmptyMessage.into());
    }

    let exchange = state.orchestrator.submit(id, body.text).await;

    let elapsed = start.elapsed().as_millis() as u64;
    tracing::info!(
        request_id = %request_id,
        conversation_id = %exchange.conversation_id,
        failed = exchange.failed,
        elapsed_ms = elapsed,
        "message answered"
    );
    Ok(Json(ApiResponse::success(exchange, request_id, elapsed)))
}

/// GET /api/v1/conversations/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Turn>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = ConversationId::new(id)?;
    let conversation = state.orchestrator.history().load(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(conversation.turns, request_id, elapsed)))
}
