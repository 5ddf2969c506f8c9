//! Job intake and preference API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use squish_core::{
    store::UserPreferences, AdmissionRejected, CancelOutcome, FileEvent, InputDescriptor, JobId,
    JobState, MediaKind, RequestedPreset, SubmitError, UserId,
};
use squish_core::transport::{is_plain_file_name, TransportError};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a file
#[derive(Debug, Deserialize)]
pub struct SubmitJobBody {
    pub user_id: i64,
    pub media_kind: MediaKind,
    /// Path relative to the configured inbox
    pub location: String,
    /// Name shown to the user; defaults to the location's last segment
    pub file_name: Option<String>,
    /// Level name or "auto"; the user's preference applies when absent
    pub preset: Option<String>,
}

/// Response for job operations
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: JobId,
    pub state: JobState,
}

/// Response for cancellation
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub job_id: JobId,
    pub outcome: CancelOutcome,
}

/// Request body for setting a preference
#[derive(Debug, Deserialize)]
pub struct SetPreferenceBody {
    pub media_kind: MediaKind,
    pub preset: String,
}

/// A user's preferences and current admission usage
#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub user_id: UserId,
    pub preferences: UserPreferences,
    pub files_this_hour: u32,
    pub files_today: u32,
    pub max_files_per_hour: u32,
    pub max_files_per_day: u32,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<AdmissionRejected>,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(JobErrorResponse {
            error: error.into(),
            rejection: None,
        }),
    )
        .into_response()
}

fn rejection_status(rejected: &AdmissionRejected) -> StatusCode {
    match rejected {
        AdmissionRejected::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        AdmissionRejected::TooSmall { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AdmissionRejected::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn parse_job_id(id: &str) -> Result<JobId, Response> {
    id.parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("Invalid job id: {}", id)))
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a file from the inbox for compression
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitJobBody>,
) -> Response {
    if let Some(preset) = &body.preset {
        if let Err(e) = preset.parse::<RequestedPreset>() {
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    }

    if let Some(name) = &body.file_name {
        if !is_plain_file_name(name) {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid file name: {:?}", name),
            );
        }
    }

    let path = match state.transport().resolve_input(&body.location).await {
        Ok(path) => path,
        Err(e @ TransportError::NotFound { .. }) => {
            return error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(e @ TransportError::InvalidLocation { .. }) => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let size_bytes = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.len(),
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut input = InputDescriptor::new(body.location, size_bytes);
    if let Some(name) = body.file_name {
        input = input.with_file_name(name);
    }
    let mut event = FileEvent::new(UserId(body.user_id), body.media_kind, input);
    event.preset = body.preset;

    match state.pipeline().submit(event).await {
        Ok(handle) => (
            StatusCode::ACCEPTED,
            Json(JobResponse {
                job_id: handle.id().clone(),
                state: handle.state(),
            }),
        )
            .into_response(),
        Err(SubmitError::Rejected(rejected)) => (
            rejection_status(&rejected),
            Json(JobErrorResponse {
                error: rejected.to_string(),
                rejection: Some(rejected),
            }),
        )
            .into_response(),
        Err(e @ SubmitError::NotRunning) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

/// State of a queued or running job
pub async fn get_job(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(response) => return response,
    };

    match state.pipeline().job_state(&job_id).await {
        Some(job_state) => Json(JobResponse {
            job_id,
            state: job_state,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", id)),
    }
}

/// Cancel a queued or running job
pub async fn cancel_job(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(response) => return response,
    };

    match state.pipeline().cancel(&job_id).await {
        Ok(outcome) => Json(CancelResponse { job_id, outcome }).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

fn preferences_response(state: &AppState, user_id: UserId) -> PreferencesResponse {
    let pipeline = state.pipeline();
    let (hourly, daily) = pipeline.usage(user_id);
    let limits = pipeline.limits();
    PreferencesResponse {
        user_id,
        preferences: pipeline.preferences(user_id),
        files_this_hour: hourly,
        files_today: daily,
        max_files_per_hour: limits.max_files_per_hour,
        max_files_per_day: limits.max_files_per_day,
    }
}

/// A user's preferences and usage
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Json<PreferencesResponse> {
    Json(preferences_response(&state, UserId(user_id)))
}

/// Set a user's default preset for one media kind
pub async fn set_preference(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<SetPreferenceBody>,
) -> Response {
    let preset: RequestedPreset = match body.preset.parse() {
        Ok(preset) => preset,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let user_id = UserId(user_id);
    state
        .pipeline()
        .set_preference(user_id, body.media_kind, preset);
    Json(preferences_response(&state, user_id)).into_response()
}
