//! End-to-end flow over the filesystem transport.
//!
//! A file dropped in the inbox is admitted, transcoded by the mock transcoder
//! and lands in the user's outbox with its metadata sidecar and message log.

use std::sync::Arc;

use tempfile::TempDir;

use squish_core::{
    job::{MediaKind, UserId},
    pipeline::{FileEvent, MediaPipeline},
    scheduler::JobOutcome,
    stats::InMemoryStats,
    testing::{fixtures, MockTranscoder},
    transport::{InputDescriptor, LocalTransport},
};

struct Setup {
    temp_dir: TempDir,
    pipeline: MediaPipeline,
}

async fn setup() -> Setup {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = fixtures::test_config(temp_dir.path());
    std::fs::create_dir_all(&config.transport.inbox_dir).unwrap();

    let transport = Arc::new(LocalTransport::new(config.transport.clone()));
    let pipeline = MediaPipeline::new(
        &config,
        Arc::new(MockTranscoder::new()),
        transport,
        Arc::new(InMemoryStats::new()),
    );
    pipeline.start().await;

    Setup { temp_dir, pipeline }
}

#[tokio::test]
async fn test_inbox_to_outbox() {
    let setup = setup().await;
    let inbox = setup.temp_dir.path().join("inbox");
    std::fs::write(inbox.join("podcast.wav"), vec![0u8; 20_000]).unwrap();

    let event = FileEvent::new(
        UserId(11),
        MediaKind::Audio,
        InputDescriptor::new("podcast.wav", 20_000),
    )
    .with_preset("low");

    let handle = setup.pipeline.submit(event).await.unwrap();
    assert!(matches!(handle.wait().await, JobOutcome::Succeeded(_)));

    let user_dir = setup.temp_dir.path().join("outbox/11");
    let output = user_dir.join("podcast_compressed.mp3");
    assert_eq!(std::fs::metadata(&output).unwrap().len(), 5_000);

    let sidecar = std::fs::read_to_string(user_dir.join("podcast_compressed.mp3.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    assert_eq!(parsed["preset"], "low");
    assert_eq!(parsed["summary"]["space_saved"], 15_000);

    let log = std::fs::read_to_string(user_dir.join("messages.log")).unwrap();
    assert!(log.contains("Processing audio: podcast.wav"));

    // The inbox copy is left alone.
    assert!(inbox.join("podcast.wav").exists());
}

#[tokio::test]
async fn test_escaping_location_fails_job() {
    let setup = setup().await;
    std::fs::write(setup.temp_dir.path().join("secret.wav"), vec![0u8; 4096]).unwrap();

    let event = FileEvent::new(
        UserId(12),
        MediaKind::Audio,
        InputDescriptor::new("../secret.wav", 4096),
    );

    let handle = setup.pipeline.submit(event).await.unwrap();
    match handle.wait().await {
        JobOutcome::Failed(e) => assert_eq!(e.label(), "transport"),
        other => panic!("Expected failure, got {:?}", other),
    }

    let log = std::fs::read_to_string(setup.temp_dir.path().join("outbox/12/messages.log")).unwrap();
    assert!(log.contains("Failed to transfer your file"));
}
