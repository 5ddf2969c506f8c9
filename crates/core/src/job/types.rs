//! Types for the job module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::preset::PresetLevel;
use crate::transcoder::{DerivedMetadata, EncodeMode};
use crate::transport::InputDescriptor;

/// Identifier of the user a job belongs to, as assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Unique job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Kind of media a job carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// One admitted file-processing request.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub media_kind: MediaKind,
    /// Where the transport can fetch the input from.
    pub input: InputDescriptor,
    /// Preset as requested: a level name or `auto`. Resolved by the runner.
    pub requested_preset: String,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Creates a job with a fresh id, submitted now.
    pub fn new(
        user_id: UserId,
        media_kind: MediaKind,
        input: InputDescriptor,
        requested_preset: impl Into<String>,
    ) -> Self {
        Self {
            id: JobId::new(),
            user_id,
            media_kind,
            input,
            requested_preset: requested_preset.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Size accounting for one finished job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionSummary {
    pub original_size: u64,
    pub compressed_size: u64,
    /// `original - compressed`, never negative.
    pub space_saved: u64,
    /// Saved share of the original in percent; 0 for an empty original.
    pub ratio_percent: f64,
}

impl CompressionSummary {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        let space_saved = original_size.saturating_sub(compressed_size);
        let ratio_percent = if original_size > 0 {
            space_saved as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };

        Self {
            original_size,
            compressed_size,
            space_saved,
            ratio_percent,
        }
    }
}

/// Report produced by a successfully completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: JobId,
    pub user_id: UserId,
    pub media_kind: MediaKind,
    /// Level the requested preset resolved to.
    pub preset: PresetLevel,
    pub summary: CompressionSummary,
    pub metadata: DerivedMetadata,
    pub mode: EncodeMode,
    pub elapsed_ms: u64,
}
