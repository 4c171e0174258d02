//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use quill_types::error::{
    ConversationError, ExchangeError, LedgerError, NotificationError, RepositoryError,
};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Exchange(ExchangeError),
    Conversation(ConversationError),
    Notification(NotificationError),
    Ledger(LedgerError),
    /// Missing or invalid credentials/identity.
    Unauthorized(String),
    Validation(String),
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        AppError::Exchange(e)
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        AppError::Notification(e)
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        AppError::Ledger(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Exchange(ExchangeError::EmptyContent) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Message content is required".to_string(),
            ),
            AppError::Exchange(ExchangeError::ConversationNotFound)
            | AppError::Conversation(ConversationError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Exchange(ExchangeError::AccountNotFound)
            | AppError::Ledger(LedgerError::AccountNotFound) => (
                StatusCode::NOT_FOUND,
                "ACCOUNT_NOT_FOUND",
                "Account not found".to_string(),
            ),
            AppError::Exchange(ExchangeError::InsufficientCredits { balance, required })
            | AppError::Ledger(LedgerError::InsufficientCredits {
                balance,
                required,
            }) => (
                StatusCode::PAYMENT_REQUIRED,
                "INSUFFICIENT_CREDITS",
                format!("Insufficient credits: balance {balance}, required {required}"),
            ),
            AppError::Exchange(ExchangeError::Transient)
            | AppError::Ledger(LedgerError::Conflict { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "TRANSIENT_CONFLICT",
                "The account is busy, please retry".to_string(),
            ),
            AppError::Conversation(ConversationError::InvalidTitle(msg))
            | AppError::Notification(NotificationError::Invalid(msg))
            | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Notification(NotificationError::NotFound) => (
                StatusCode::NOT_FOUND,
                "NOTIFICATION_NOT_FOUND",
                "Notification not found".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Exchange(e) => (StatusCode::INTERNAL_SERVER_ERROR, "EXCHANGE_ERROR", e.to_string()),
            AppError::Conversation(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONVERSATION_ERROR",
                e.to_string(),
            ),
            AppError::Notification(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOTIFICATION_ERROR",
                e.to_string(),
            ),
            AppError::Ledger(e) => (StatusCode::INTERNAL_SERVER_ERROR, "LEDGER_ERROR", e.to_string()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
