//! Error type for a job that did not complete successfully.

use thiserror::Error;

use crate::preset::PresetError;
use crate::transcoder::{TranscodeError, TranscodeErrorKind};
use crate::transport::TransportError;

/// Why a dispatched job ended without a result.
///
/// `Display` carries operator-level detail; [`JobError::user_message`] is the
/// summarized text that may be shown to the submitting user.
#[derive(Debug, Error)]
pub enum JobError {
    /// The requested preset does not exist for the media kind.
    #[error(transparent)]
    Preset(#[from] PresetError),

    /// The external transcoder failed.
    #[error("Transcode failed: {0}")]
    Transcode(#[from] TranscodeError),

    /// Fetching the input or delivering the output failed.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Private job storage could not be prepared.
    #[error("Workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// The job was cancelled while running.
    #[error("Job cancelled")]
    Cancelled,

    /// Scheduler bookkeeping failed for this job.
    #[error("Internal scheduling error: {0}")]
    Internal(String),
}

impl JobError {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preset(_) => "unknown_preset",
            Self::Transcode(e) => match e.kind() {
                TranscodeErrorKind::Timeout => "timeout",
                TranscodeErrorKind::NonZeroExit => "non_zero_exit",
                TranscodeErrorKind::Unavailable => "unavailable",
                TranscodeErrorKind::Cancelled => "cancelled",
                TranscodeErrorKind::Probe => "probe",
                TranscodeErrorKind::Io => "transcode_io",
            },
            Self::Transport(_) => "transport",
            Self::Workspace(_) => "workspace",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error stems from a cancellation request.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Transcode(e) => e.kind() == TranscodeErrorKind::Cancelled,
            _ => false,
        }
    }

    /// Summarized text for the end user. Never includes process diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            Self::Preset(e) => format!("{}. Choose another quality level.", e),
            Self::Transcode(e) => match e.kind() {
                TranscodeErrorKind::Timeout => {
                    "Compression took too long and was stopped. Try a lower quality level."
                        .to_string()
                }
                TranscodeErrorKind::Unavailable => {
                    "Compression is temporarily unavailable. Please try again later.".to_string()
                }
                TranscodeErrorKind::Cancelled => "Compression was cancelled.".to_string(),
                TranscodeErrorKind::NonZeroExit
                | TranscodeErrorKind::Probe
                | TranscodeErrorKind::Io => {
                    "Compression failed. Please try again.".to_string()
                }
            },
            Self::Transport(_) => "Failed to transfer your file. Please try again.".to_string(),
            Self::Cancelled => "Compression was cancelled.".to_string(),
            Self::Workspace(_) | Self::Internal(_) => {
                "Processing error. Please try again.".to_string()
            }
        }
    }
}
