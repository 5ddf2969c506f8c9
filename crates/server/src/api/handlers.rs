use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use squish_core::{Config, PipelineStatus};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub transcoder_available: bool,
    pub timestamp: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        transcoder_available: state.pipeline().is_transcoder_available().await,
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<PipelineStatus> {
    Json(state.pipeline().status().await)
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
