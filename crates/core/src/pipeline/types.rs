//! Types for the pipeline module.

use serde::{Deserialize, Serialize};

use crate::job::{MediaKind, UserId};
use crate::scheduler::SchedulerStatus;
use crate::transport::InputDescriptor;

/// An inbound file as announced by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    pub user_id: UserId,
    pub media_kind: MediaKind,
    pub input: InputDescriptor,
    /// Level name or `auto`. The user's stored preference applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl FileEvent {
    pub fn new(user_id: UserId, media_kind: MediaKind, input: InputDescriptor) -> Self {
        Self {
            user_id,
            media_kind,
            input,
            preset: None,
        }
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }
}

/// Snapshot of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub running: bool,
    #[serde(flatten)]
    pub scheduler: SchedulerStatus,
}
