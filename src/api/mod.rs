//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; the WebSocket upgrade
//! is served at `/ws` and at `/api/socket`.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "hackmatch-relay", description = "Direct-message relay for hackmatch"),
    paths(
        handlers::system::health_handler,
        handlers::system::stats_handler,
        handlers::presence::user_status,
        handlers::presence::online_users,
        handlers::messages::send_message,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        crate::service::RelayStats,
        dto::UserStatusResponse,
        dto::OnlineUsersResponse,
        dto::SendMessageRequest,
        dto::SendMessageResponse,
    )),
    tags(
        (name = "System", description = "Health and counters"),
        (name = "Presence", description = "Connected users"),
        (name = "Messages", description = "Server-side message trigger"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, docs, and middleware.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .merge(docs_router())
        .route("/ws", get(ws_handler))
        .route("/api/socket", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::config::RelayConfig;
    use crate::domain::{ConnectionHandle, ConnectionId, UserId};

    fn state() -> AppState {
        AppState::new(RelayConfig {
            max_message_bytes: 8,
            ..RelayConfig::default()
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("readable body");
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    fn get_req(uri: &str) -> Request<Body> {
        let Ok(req) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        req
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        let Ok(req) = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("valid request");
        };
        req
    }

    #[test]
    fn openapi_lists_all_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/stats",
            "/api/v1/users/{user_id}/status",
            "/api/v1/users/online",
            "/api/v1/messages",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(state());
        let Ok(response) = app.oneshot(get_req("/health")).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn status_of_unknown_user_is_offline() {
        let app = build_app(state());
        let Ok(response) = app.oneshot(get_req("/api/v1/users/carol/status")).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user_id"], "carol");
        assert_eq!(body["online"], false);
        assert!(body["last_seen"].is_null());
    }

    #[tokio::test]
    async fn online_users_reflect_registry() {
        let state = state();
        let (tx, _rx) = mpsc::channel(4);
        let Ok(bob) = UserId::parse("bob") else {
            panic!("valid id");
        };
        state
            .relay_service
            .registry()
            .register(bob, ConnectionHandle::new(ConnectionId::new(), tx))
            .await;

        let app = build_app(state);
        let Ok(response) = app.oneshot(get_req("/api/v1/users/online")).await else {
            panic!("infallible");
        };
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["users"][0], "bob");
    }

    #[tokio::test]
    async fn post_message_reaches_connected_user() {
        let state = state();
        let (tx, mut rx) = mpsc::channel(4);
        let Ok(bob) = UserId::parse("bob") else {
            panic!("valid id");
        };
        state
            .relay_service
            .registry()
            .register(bob, ConnectionHandle::new(ConnectionId::new(), tx))
            .await;
        let relay = Arc::clone(&state.relay_service);

        let app = build_app(state);
        let req = post_json(
            "/api/v1/messages",
            serde_json::json!({"from": "alice", "to": "bob", "message": "hi"}),
        );
        let Ok(response) = app.oneshot(req).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let Ok(delivery) = rx.try_recv() else {
            panic!("bob should receive");
        };
        assert_eq!(delivery.message, "hi");
        assert_eq!(relay.stats().await.relayed, 1);
    }

    #[tokio::test]
    async fn post_message_to_absent_user_is_still_accepted() {
        let app = build_app(state());
        let req = post_json(
            "/api/v1/messages",
            serde_json::json!({"from": "alice", "to": "carol", "message": "hi?"}),
        );
        let Ok(response) = app.oneshot(req).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(response).await["accepted"], true);
    }

    #[tokio::test]
    async fn post_message_validation_errors() {
        let app = build_app(state());
        let req = post_json(
            "/api/v1/messages",
            serde_json::json!({"from": "alice", "to": "", "message": "hi"}),
        );
        let Ok(response) = app.clone().oneshot(req).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], 1001);

        let req = post_json(
            "/api/v1/messages",
            serde_json::json!({"from": "alice", "to": "bob", "message": "way too long"}),
        );
        let Ok(response) = app.oneshot(req).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
