//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api;
use crate::state::AppState;
use crate::ws;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // API routes
        .route("/api/status", get(api::get_status))
        .route("/api/fingers", get(api::get_fingers))
        .route("/api/motion", get(api::get_motion))
        .route("/api/config", get(api::get_config))
        .route("/api/frames", post(api::submit_frame))
        // WebSocket broadcast stream
        .route("/ws", get(ws::websocket_handler))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // State
        .with_state(state)
}

/// Run the web server until it fails
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, "Starting broadcast server");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn frame_json() -> String {
        // Reported "Left" hand with every fingertip on its knuckle
        let point = r#"{"x": 0.5, "y": 0.5, "z": 0.0}"#;
        let points = vec![point; 21].join(",");
        format!(
            r#"{{"timestamp_ms": 7, "hands": [{{"handedness": "Left", "landmarks": [{points}], "world_landmarks": [{points}]}}]}}"#
        )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_route() {
        let state = AppState::new(Config::default()).unwrap();
        let response = router(state)
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["running"], true);
        assert_eq!(body["ready"], false);
        assert_eq!(body["clients"], 0);
        assert_eq!(body["wire_format"], "legacy");
    }

    #[tokio::test]
    async fn test_submit_frame_updates_fingers() {
        let state = AppState::new(Config::default()).unwrap();
        let mut view = state.view.clone();

        let response = router(state.clone())
            .oneshot(
                Request::post("/api/frames")
                    .header("content-type", "application/json")
                    .body(Body::from(frame_json()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        view.changed().await.unwrap();

        let response = router(state)
            .oneshot(Request::get("/api/fingers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["right"][1], "bent");
        assert_eq!(body["left"][1], "extended");
    }

    #[tokio::test]
    async fn test_malformed_frame_rejected() {
        let state = AppState::new(Config::default()).unwrap();
        let response = router(state.clone())
            .oneshot(
                Request::post("/api/frames")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"hands": [{"handedness": "Middle"}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(state.stats.frames_processed(), 0);
    }

    #[tokio::test]
    async fn test_motion_route() {
        let state = AppState::new(Config::default()).unwrap();
        let response = router(state)
            .oneshot(Request::get("/api/motion").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["left"]["isolated"][0], true);
        assert_eq!(body["right"]["total_change"][4], 0.0);
    }
}
