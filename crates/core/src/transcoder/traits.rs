//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::error::TranscodeError;
use super::types::{DerivedMetadata, TranscodeRequest, TranscodeResult};

/// Runs one external transcode per call.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Transcodes `request.input_path` into `request.output_path`.
    ///
    /// The process is killed and partial output removed when the timeout
    /// elapses or `cancel` fires.
    async fn transcode(&self, request: TranscodeRequest, cancel: CancellationToken)
        -> TranscodeResult;

    /// Reads duration and dimensions from a media file.
    async fn probe(&self, path: &Path) -> Result<DerivedMetadata, TranscodeError>;

    /// Checks that the transcoder can run.
    async fn validate(&self) -> Result<(), TranscodeError>;

    async fn is_available(&self) -> bool {
        self.validate().await.is_ok()
    }
}
