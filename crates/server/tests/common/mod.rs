//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a real filesystem transport under a temp dir and a mock
//! transcoder, so requests can be driven end to end without ffmpeg.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use squish_core::{
    testing::MockTranscoder, Config, InMemoryStats, LocalTransport, MediaPipeline,
};
use squish_server::state::AppState;

/// Re-export fixtures for test convenience
pub use squish_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new().await;
///     fixture.add_inbox_file("memo.ogg", 8192);
///
///     let response = fixture.post("/api/v1/jobs", json!({
///         "user_id": 1,
///         "media_kind": "audio",
///         "location": "memo.ogg"
///     })).await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock transcoder - control output size, delays and failures
    pub transcoder: Arc<MockTranscoder>,
    /// Shared state, for inspecting the pipeline directly
    pub state: Arc<AppState>,
    /// Holds the inbox, outbox and workspace directories
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default limits.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test fixture after adjusting the default configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = fixtures::test_config(temp_dir.path());
        adjust(&mut config);
        std::fs::create_dir_all(&config.transport.inbox_dir).expect("Failed to create inbox");

        let transcoder = Arc::new(MockTranscoder::new());
        let transport = Arc::new(LocalTransport::new(config.transport.clone()));
        let stats = Arc::new(InMemoryStats::new());

        let pipeline = Arc::new(MediaPipeline::new(
            &config,
            transcoder.clone(),
            transport.clone(),
            stats.clone(),
        ));
        pipeline.start().await;

        let state = Arc::new(AppState::new(config, pipeline, transport, stats));
        let router = squish_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            transcoder,
            state,
            temp_dir,
        }
    }

    /// Write a file of `size` bytes into the inbox.
    pub fn add_inbox_file(&self, name: &str, size: usize) -> PathBuf {
        let path = self.temp_dir.path().join("inbox").join(name);
        std::fs::write(&path, vec![0u8; size]).expect("Failed to write inbox file");
        path
    }

    /// Path of a user's outbox directory.
    pub fn outbox(&self, user_id: i64) -> PathBuf {
        self.temp_dir.path().join("outbox").join(user_id.to_string())
    }

    /// Poll until the scheduler is idle.
    pub async fn wait_idle(&self) {
        for _ in 0..200 {
            let status = self.state.pipeline().status().await;
            if status.scheduler.active_jobs == 0 && status.scheduler.queued_jobs == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("pipeline did not become idle");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
