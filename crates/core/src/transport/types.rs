//! Types for the transport module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::{CompressionSummary, JobId, MediaKind};
use crate::preset::PresetLevel;
use crate::transcoder::{DerivedMetadata, EncodeMode};

/// Where an inbound file can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    /// Transport-specific location (a path, file id or URL).
    pub location: String,
    /// Original file name as sent by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Size announced by the transport, used for admission.
    pub size_bytes: u64,
}

impl InputDescriptor {
    pub fn new(location: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            location: location.into(),
            file_name: None,
            size_bytes,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// File name for display and output naming.
    ///
    /// Always a single path component: directories are stripped and `.`/`..`
    /// are never returned.
    pub fn display_name(&self) -> &str {
        self.file_name
            .as_deref()
            .and_then(last_component)
            .or_else(|| last_component(&self.location))
            .unwrap_or("file")
    }

    /// Display name without its extension.
    pub fn stem(&self) -> &str {
        let name = self.display_name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

/// Last non-empty segment of `name` split on either separator, unless it is
/// a relative directory reference.
fn last_component(name: &str) -> Option<&str> {
    name.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .filter(|segment| !matches!(*segment, "." | ".."))
}

/// Whether a client-supplied file name is a plain name with no directory part.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !matches!(name, "." | "..")
}

/// A finished output ready to hand back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub path: PathBuf,
    /// Name the user should see.
    pub file_name: String,
    pub size_bytes: u64,
    pub media_kind: MediaKind,
}

/// Result details sent alongside a delivered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryMetadata {
    pub job_id: JobId,
    pub preset: PresetLevel,
    pub summary: CompressionSummary,
    pub derived: DerivedMetadata,
    pub mode: EncodeMode,
    /// Human-readable result text.
    pub caption: String,
}
