//! HTTP API integration tests.
//!
//! Requests go through the full router against a filesystem transport in a
//! temp dir and a mock transcoder.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::TestFixture;

#[tokio::test]
async fn test_health_reports_transcoder() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["transcoder_available"], true);

    fixture.transcoder.set_available(false).await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.body["transcoder_available"], false);
}

#[tokio::test]
async fn test_status_and_config() {
    let fixture = TestFixture::new().await;

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["running"], true);
    assert_eq!(status.body["active_jobs"], 0);

    let config = fixture.get("/api/v1/config").await;
    assert_eq!(config.status, StatusCode::OK);
    assert_eq!(config.body["limits"]["max_files_per_hour"], 10);
    assert_eq!(config.body["scheduler"]["max_concurrent"], 3);
}

#[tokio::test]
async fn test_submit_compresses_into_outbox() {
    let fixture = TestFixture::new().await;
    fixture.add_inbox_file("interview.wav", 40_000);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "user_id": 5,
                "media_kind": "audio",
                "location": "interview.wav",
                "preset": "high"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert!(response.body["job_id"].is_string());

    fixture.wait_idle().await;

    let output = fixture.outbox(5).join("interview_compressed.mp3");
    assert_eq!(std::fs::metadata(output).unwrap().len(), 10_000);

    let stats = fixture.get("/api/v1/stats").await;
    assert_eq!(stats.body["total_files_processed"], 1);
    assert_eq!(stats.body["total_bytes_saved"], 30_000);

    let user = fixture.get("/api/v1/stats/users/5").await;
    assert_eq!(user.status, StatusCode::OK);
    assert_eq!(user.body["files"], 1);
    assert_eq!(user.body["audio_files"], 1);
}

#[tokio::test]
async fn test_submit_missing_input_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "user_id": 1, "media_kind": "audio", "location": "nope.mp3" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_escaping_location_is_bad_request() {
    let fixture = TestFixture::new().await;
    std::fs::write(fixture.temp_dir.path().join("secret.mp3"), vec![0u8; 4096]).unwrap();

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "user_id": 1, "media_kind": "audio", "location": "../secret.mp3" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_file_name_with_path_is_bad_request() {
    let fixture = TestFixture::new().await;
    fixture.add_inbox_file("memo.ogg", 4096);

    for name in ["../../escape.ogg", "sub/dir.ogg", ".."] {
        let response = fixture
            .post(
                "/api/v1/jobs",
                json!({
                    "user_id": 1,
                    "media_kind": "audio",
                    "location": "memo.ogg",
                    "file_name": name
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "name {:?}", name);
    }
    assert_eq!(fixture.transcoder.request_count().await, 0);

    let accepted = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "user_id": 1,
                "media_kind": "audio",
                "location": "memo.ogg",
                "file_name": "Voice memo.ogg"
            }),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::ACCEPTED);
    fixture.wait_idle().await;
    assert!(fixture.outbox(1).join("Voice memo_compressed.mp3").exists());
}

#[tokio::test]
async fn test_submit_unknown_preset_is_bad_request() {
    let fixture = TestFixture::new().await;
    fixture.add_inbox_file("a.mp3", 4096);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({
                "user_id": 1,
                "media_kind": "audio",
                "location": "a.mp3",
                "preset": "extreme"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.transcoder.request_count().await, 0);
}

#[tokio::test]
async fn test_too_small_file_is_rejected() {
    let fixture = TestFixture::new().await;
    fixture.add_inbox_file("tiny.mp3", 100);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "user_id": 3, "media_kind": "audio", "location": "tiny.mp3" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["rejection"]["reason"], "too_small");

    let log = std::fs::read_to_string(fixture.outbox(3).join("messages.log")).unwrap();
    assert!(log.contains("File too small"));
}

#[tokio::test]
async fn test_rate_limit_returns_too_many_requests() {
    let fixture = TestFixture::with_config(|config| {
        config.limits = config.limits.clone().with_rate_caps(1, 50);
    })
    .await;
    fixture.add_inbox_file("first.mp3", 4096);
    fixture.add_inbox_file("second.mp3", 4096);

    let body = |location: &str| json!({ "user_id": 8, "media_kind": "audio", "location": location });

    let first = fixture.post("/api/v1/jobs", body("first.mp3")).await;
    assert_eq!(first.status, StatusCode::ACCEPTED);

    let second = fixture.post("/api/v1/jobs", body("second.mp3")).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.body["rejection"]["reason"], "rate_limited");
    assert_eq!(second.body["rejection"]["scope"], "hourly");
    assert_eq!(second.body["rejection"]["limit"], 1);
}

#[tokio::test]
async fn test_preferences_round_trip_through_api() {
    let fixture = TestFixture::new().await;

    let initial = fixture.get("/api/v1/users/4/preferences").await;
    assert_eq!(initial.status, StatusCode::OK);
    assert_eq!(initial.body["preferences"]["audio"], "medium");
    assert_eq!(initial.body["files_this_hour"], 0);

    let updated = fixture
        .put(
            "/api/v1/users/4/preferences",
            json!({ "media_kind": "audio", "preset": "auto" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["preferences"]["audio"], "auto");
    assert_eq!(updated.body["preferences"]["video"], "medium");

    let invalid = fixture
        .put(
            "/api/v1/users/4/preferences",
            json!({ "media_kind": "video", "preset": "best" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stored_preference_applies_to_submission() {
    let fixture = TestFixture::new().await;
    fixture
        .put(
            "/api/v1/users/6/preferences",
            json!({ "media_kind": "audio", "preset": "ultra_low" }),
        )
        .await;
    fixture.add_inbox_file("note.wav", 8192);

    let response = fixture
        .post(
            "/api/v1/jobs",
            json!({ "user_id": 6, "media_kind": "audio", "location": "note.wav" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    fixture.wait_idle().await;

    let requests = fixture.transcoder.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].profile.level.as_str(), "ultra_low");
}

#[tokio::test]
async fn test_job_lookup_and_cancel() {
    let fixture = TestFixture::new().await;
    fixture.transcoder.set_delay(Duration::from_secs(10)).await;
    fixture.add_inbox_file("long.wav", 4096);

    let submitted = fixture
        .post(
            "/api/v1/jobs",
            json!({ "user_id": 2, "media_kind": "audio", "location": "long.wav" }),
        )
        .await;
    let job_id = submitted.body["job_id"].as_str().unwrap().to_string();

    let found = fixture.get(&format!("/api/v1/jobs/{}", job_id)).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["job_id"], job_id.as_str());

    let cancelled = fixture.delete(&format!("/api/v1/jobs/{}", job_id)).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    fixture.wait_idle().await;

    let gone = fixture.get(&format!("/api/v1/jobs/{}", job_id)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(!fixture.outbox(2).join("long_compressed.mp3").exists());
}

#[tokio::test]
async fn test_unknown_job_and_user() {
    let fixture = TestFixture::new().await;

    let bad_id = fixture.get("/api/v1/jobs/not-a-uuid").await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let missing = fixture
        .get("/api/v1/jobs/550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let cancel_missing = fixture
        .delete("/api/v1/jobs/550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(cancel_missing.status, StatusCode::NOT_FOUND);

    let user = fixture.get("/api/v1/stats/users/999").await;
    assert_eq!(user.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let (status, text) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("squish_http_requests_total"));
    assert!(text.contains("squish_pipeline_running"));
}
