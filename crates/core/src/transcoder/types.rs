//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::job::JobId;
use crate::preset::PresetProfile;

use super::error::TranscodeError;

/// One transcoder invocation.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub job_id: JobId,
    pub input_path: PathBuf,
    /// Target file. Nothing is written outside its parent directory.
    pub output_path: PathBuf,
    pub profile: PresetProfile,
    /// Hard ceiling on the external process's runtime.
    pub timeout: Duration,
}

/// Media properties probed from the input. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl DerivedMetadata {
    pub fn is_empty(&self) -> bool {
        self.duration_secs.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// How the output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeMode {
    /// Re-encoded by the external transcoder.
    Encoded,
    /// Transcoder unavailable; the input was copied unchanged.
    PassthroughCopy,
}

/// Successful transcode.
#[derive(Debug, Clone)]
pub struct TranscodeOutput {
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub metadata: DerivedMetadata,
    pub mode: EncodeMode,
    pub elapsed_ms: u64,
}

/// Result of a single transcode attempt.
pub type TranscodeResult = Result<TranscodeOutput, TranscodeError>;
