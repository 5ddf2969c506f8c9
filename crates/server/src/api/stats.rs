//! Stats API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use squish_core::{StatsSnapshot, UserId, UserStats};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct StatsErrorResponse {
    pub error: String,
}

/// Full counters document.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.stats().snapshot().await)
}

/// Counters for one user.
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStats>, (StatusCode, Json<StatsErrorResponse>)> {
    state.stats().user(UserId(user_id)).await.map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(StatsErrorResponse {
                error: format!("No stats for user {}", user_id),
            }),
        )
    })
}
