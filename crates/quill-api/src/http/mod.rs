//! HTTP/REST API layer for Quill.
//!
//! Axum-based REST API at `/api/v1/` with header-based identity, admin API
//! key authentication, envelope response format, and a WebSocket endpoint
//! for live notifications.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
