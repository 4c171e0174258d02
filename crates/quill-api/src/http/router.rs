//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, plus `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Conversations
        .route(
            "/conversations",
            post(handlers::conversation::create_conversation)
                .get(handlers::conversation::list_conversations),
        )
        .route(
            "/conversations/{id}",
            axum::routing::delete(handlers::conversation::delete_conversation),
        )
        .route(
            "/conversations/{id}/turns",
            get(handlers::conversation::list_turns),
        )
        .route(
            "/conversations/{id}/title",
            put(handlers::conversation::rename_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::conversation::submit_message),
        )
        // Accounts
        .route("/accounts/me", get(handlers::account::get_me))
        // Notifications
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/admin/notifications/broadcast",
            post(handlers::notification::broadcast),
        )
        .route(
            "/admin/notifications/targeted",
            post(handlers::notification::targeted),
        )
        // Live transport
        .route("/ws/notifications", get(handlers::ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use quill_infra::sqlite::pool::DatabasePool;
    use quill_types::account::AccountId;
    use quill_types::config::QuillConfig;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::http::extractors::identity::{ACCOUNT_HEADER, ORGANIZATION_HEADER};

    async fn test_state(config: QuillConfig) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        AppState::assemble(data_dir, pool, config, None)
    }

    struct Caller {
        account: AccountId,
        org: Uuid,
    }

    impl Caller {
        fn new() -> Self {
            Self {
                account: AccountId::new(),
                org: Uuid::now_v7(),
            }
        }

        fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(ACCOUNT_HEADER, self.account.to_string())
                .header(ORGANIZATION_HEADER, self.org.to_string());
            match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            }
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = build_router(test_state(QuillConfig::default()).await);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn exchange_flow_debits_until_insufficient() {
        let config = QuillConfig {
            initial_credits: 15,
            ..QuillConfig::default()
        };
        let app = build_router(test_state(config).await);
        let caller = Caller::new();

        let (status, json) = send(&app, caller.request("POST", "/api/v1/conversations", None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["title"], "New Chat");
        let conv_id = json["data"]["id"].as_str().unwrap().to_string();
        let messages = format!("/api/v1/conversations/{conv_id}/messages");

        let (status, json) = send(
            &app,
            caller.request("POST", &messages, Some(serde_json::json!({"content": "Explain ownership"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["remaining_credits"], 5);
        assert_eq!(json["data"]["new_title"], "Explain ownership");
        assert!(
            json["data"]["assistant_turn"]["content"]
                .as_str()
                .unwrap()
                .starts_with("This is a simulated response")
        );

        let (status, json) = send(
            &app,
            caller.request("POST", &messages, Some(serde_json::json!({"content": "And borrowing?"}))),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(json["errors"][0]["code"], "INSUFFICIENT_CREDITS");

        let (_, json) = send(&app, caller.request("GET", "/api/v1/accounts/me", None)).await;
        assert_eq!(json["data"]["credits"], 5);

        let (_, json) = send(
            &app,
            caller.request("GET", &format!("/api/v1/conversations/{conv_id}/turns"), None),
        )
        .await;
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let app = build_router(test_state(QuillConfig::default()).await);
        let caller = Caller::new();
        let (_, json) = send(&app, caller.request("POST", "/api/v1/conversations", None)).await;
        let conv_id = json["data"]["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            caller.request(
                "POST",
                &format!("/api/v1/conversations/{conv_id}/messages"),
                Some(serde_json::json!({"content": "   "})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");

        let (_, json) = send(&app, caller.request("GET", "/api/v1/accounts/me", None)).await;
        assert_eq!(json["data"]["credits"], 1000);
    }

    #[tokio::test]
    async fn foreign_conversation_is_not_found() {
        let app = build_router(test_state(QuillConfig::default()).await);
        let owner = Caller::new();
        let stranger = Caller::new();
        let (_, json) = send(&app, owner.request("POST", "/api/v1/conversations", None)).await;
        let conv_id = json["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            stranger.request(
                "POST",
                &format!("/api/v1/conversations/{conv_id}/messages"),
                Some(serde_json::json!({"content": "hi"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            stranger.request("DELETE", &format!("/api/v1/conversations/{conv_id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let app = build_router(test_state(QuillConfig::default()).await);
        let req = Request::builder()
            .uri("/api/v1/accounts/me")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_dispatch_requires_key_and_lists_for_recipient() {
        let state = test_state(QuillConfig::default()).await;
        let key = state.api_keys.ensure_admin_key().await.unwrap().unwrap();
        let app = build_router(state);
        let caller = Caller::new();

        let body = serde_json::json!({
            "account_id": caller.account.to_string(),
            "title": "Welcome",
            "message": "Thanks for joining",
        });

        let unauthenticated = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/notifications/targeted")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = send(&app, unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let authed = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/notifications/targeted")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {key}"))
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, json) = send(&app, authed).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["delivered_live"], 0);
        let id = json["data"]["notification"]["id"].as_str().unwrap().to_string();

        let (_, json) = send(&app, caller.request("GET", "/api/v1/notifications", None)).await;
        let list = json["data"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["type"], "user");
        assert_eq!(list[0]["read"], false);

        for _ in 0..2 {
            let (status, json) = send(
                &app,
                caller.request("PUT", &format!("/api/v1/notifications/{id}/read"), None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["data"]["read"], true);
        }

        let stranger = Caller::new();
        let (status, _) = send(
            &app,
            stranger.request("PUT", &format!("/api/v1/notifications/{id}/read"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn broadcast_with_blank_title_is_rejected() {
        let state = test_state(QuillConfig::default()).await;
        let key = state.api_keys.ensure_admin_key().await.unwrap().unwrap();
        let app = build_router(state);

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/notifications/broadcast")
            .header("content-type", "application/json")
            .header("x-api-key", key)
            .body(Body::from(
                serde_json::json!({"title": " ", "message": "m"}).to_string(),
            ))
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }
}
