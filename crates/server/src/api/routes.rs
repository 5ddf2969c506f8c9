use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, jobs, middleware::metrics_middleware, stats};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, status and config
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::get_status))
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/jobs", post(jobs::submit_job))
        .route("/jobs/{id}", get(jobs::get_job).delete(jobs::cancel_job))
        // Preferences
        .route(
            "/users/{id}/preferences",
            get(jobs::get_preferences).put(jobs::set_preference),
        )
        // Stats
        .route("/stats", get(stats::get_stats))
        .route("/stats/users/{id}", get(stats::get_user_stats));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
