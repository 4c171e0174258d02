//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/conversations                 - Start a conversation
//! - GET    /api/v1/conversations                 - List the caller's conversations
//! - GET    /api/v1/conversations/{id}/turns      - Full turn history
//! - PUT    /api/v1/conversations/{id}/title      - Rename
//! - DELETE /api/v1/conversations/{id}            - Delete with its turns
//! - POST   /api/v1/conversations/{id}/messages   - Run one credit-metered exchange

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use quill_types::chat::{Conversation, Exchange, Turn};

use super::parse_uuid;
use crate::http::error::AppError;
use crate::http::extractors::identity::Caller;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

/// POST /api/v1/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<ApiResponse<Conversation>, AppError> {
    let start = Instant::now();
    let conversation = state
        .conversation_service
        .create_conversation(caller.account_id, caller.organization()?)
        .await?;
    Ok(ApiResponse::created(conversation, start))
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<ApiResponse<Vec<Conversation>>, AppError> {
    let start = Instant::now();
    let conversations = state
        .conversation_service
        .list_conversations(&caller.account_id, &caller.organization()?)
        .await?;
    Ok(ApiResponse::success(conversations, start))
}

/// GET /api/v1/conversations/{id}/turns
pub async fn list_turns(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Turn>>, AppError> {
    let start = Instant::now();
    let conversation_id = parse_uuid(&id)?;
    let turns = state
        .conversation_service
        .list_turns(&caller.account_id, &conversation_id)
        .await?;
    Ok(ApiResponse::success(turns, start))
}

/// PUT /api/v1/conversations/{id}/title
pub async fn rename_conversation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let start = Instant::now();
    let conversation_id = parse_uuid(&id)?;
    let conversation = state
        .conversation_service
        .rename_conversation(&caller.account_id, &conversation_id, &body.title)
        .await?;
    Ok(ApiResponse::success(conversation, start))
}

/// DELETE /api/v1/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let conversation_id = parse_uuid(&id)?;
    state
        .conversation_service
        .delete_conversation(&caller.account_id, &conversation_id)
        .await?;
    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": conversation_id }),
        start,
    ))
}

/// POST /api/v1/conversations/{id}/messages
pub async fn submit_message(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<SubmitMessageRequest>,
) -> Result<ApiResponse<Exchange>, AppError> {
    let start = Instant::now();
    let conversation_id = parse_uuid(&id)?;
    let exchange = state
        .pipeline
        .submit_message(&caller.account_id, &conversation_id, &body.content)
        .await?;
    Ok(ApiResponse::success(exchange, start))
}
