//! Account HTTP handlers.

use std::time::Instant;

use axum::extract::State;

use quill_types::account::AccountBalance;

use crate::http::error::AppError;
use crate::http::extractors::identity::Caller;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/accounts/me - Current credit balance.
pub async fn get_me(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<ApiResponse<AccountBalance>, AppError> {
    let start = Instant::now();
    let credits = state.pipeline.ledger().balance(&caller.account_id).await?;
    Ok(ApiResponse::success(
        AccountBalance {
            account_id: caller.account_id,
            credits,
        },
        start,
    ))
}
