//! REST API handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use handcast_core::{Broadcaster, FrameResult, WireFormat};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Daemon status
#[derive(Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub ready: bool,
    pub clients: usize,
    pub wire_format: WireFormat,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub hands_skipped: u64,
    pub messages_emitted: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

/// Get daemon status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let broadcaster = &state.broadcaster;
    Json(StatusResponse {
        running: !state.frames.is_closed(),
        ready: broadcaster.is_ready(),
        clients: broadcaster.clients(),
        wire_format: broadcaster.format(),
        frames_processed: state.stats.frames_processed(),
        frames_dropped: state.stats.frames_dropped(),
        hands_skipped: state.stats.hands_skipped(),
        messages_emitted: broadcaster.emitted(),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// Get the current bend state of every finger
pub async fn get_fingers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.view().fingers)
}

/// Fingertip motion per hand
#[derive(Serialize)]
struct MotionResponse {
    left: handcast_core::MotionSummary,
    right: handcast_core::MotionSummary,
}

/// Get fingertip motion figures
pub async fn get_motion(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.view();
    Json(MotionResponse {
        left: view.left_motion,
        right: view.right_motion,
    })
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}

/// Queue one frame from the inference collaborator
pub async fn submit_frame(
    State(state): State<Arc<AppState>>,
    Json(frame): Json<FrameResult>,
) -> impl IntoResponse {
    debug!(hands = frame.hands.len(), timestamp_ms = frame.timestamp_ms, "Frame received");

    match state.frames.submit(frame) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"status": "queued"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(e.to_string())),
        )
            .into_response(),
    }
}
