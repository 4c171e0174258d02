//! Notification HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/notifications                       - Caller's notifications, newest first
//! - PUT  /api/v1/notifications/{id}/read             - Mark one read
//! - PUT  /api/v1/notifications/read-all              - Mark all visible read
//! - POST /api/v1/admin/notifications/broadcast       - Dispatch to everyone (admin key)
//! - POST /api/v1/admin/notifications/targeted        - Dispatch to one account (admin key)

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use quill_core::live::dispatcher::DispatchReport;
use quill_types::account::AccountId;
use quill_types::notification::{NotificationPayload, NotificationScope};

use super::parse_uuid;
use crate::http::error::AppError;
use crate::http::extractors::auth::AdminAuthenticated;
use crate::http::extractors::identity::Caller;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetedRequest {
    pub account_id: AccountId,
    pub title: String,
    pub message: String,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<ApiResponse<Vec<NotificationPayload>>, AppError> {
    let start = Instant::now();
    let notifications = state.dispatcher.list_for(&caller.account_id).await?;
    let payloads = notifications.iter().map(NotificationPayload::from).collect();
    Ok(ApiResponse::success(payloads, start))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<ApiResponse<NotificationPayload>, AppError> {
    let start = Instant::now();
    let notification_id = parse_uuid(&id)?;
    let notification = state
        .dispatcher
        .mark_read(&notification_id, &caller.account_id)
        .await?;
    Ok(ApiResponse::success(
        NotificationPayload::from(&notification),
        start,
    ))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let updated = state.dispatcher.mark_all_read(&caller.account_id).await?;
    Ok(ApiResponse::success(
        serde_json::json!({ "updated": updated }),
        start,
    ))
}

/// POST /api/v1/admin/notifications/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Json(body): Json<BroadcastRequest>,
) -> Result<ApiResponse<DispatchReport>, AppError> {
    let start = Instant::now();
    let report = state
        .dispatcher
        .dispatch(NotificationScope::Broadcast, &body.title, &body.message)
        .await?;
    Ok(ApiResponse::created(report, start))
}

/// POST /api/v1/admin/notifications/targeted
pub async fn targeted(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Json(body): Json<TargetedRequest>,
) -> Result<ApiResponse<DispatchReport>, AppError> {
    let start = Instant::now();
    let report = state
        .dispatcher
        .dispatch(
            NotificationScope::Targeted {
                account_id: body.account_id,
            },
            &body.title,
            &body.message,
        )
        .await?;
    Ok(ApiResponse::created(report, start))
}
