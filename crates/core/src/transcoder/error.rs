//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of [`TranscodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeErrorKind {
    Timeout,
    NonZeroExit,
    Unavailable,
    Cancelled,
    Probe,
    Io,
}

impl TranscodeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NonZeroExit => "non_zero_exit",
            Self::Unavailable => "unavailable",
            Self::Cancelled => "cancelled",
            Self::Probe => "probe",
            Self::Io => "io",
        }
    }
}

/// Errors that can occur while transcoding or probing.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The process ran past its deadline and was killed.
    #[error("Transcoder timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The process exited unsuccessfully. `diagnostics` is its stderr tail.
    #[error("Transcoder exited with {}", describe_code(.code))]
    NonZeroExit {
        code: Option<i32>,
        diagnostics: String,
    },

    /// The transcoder binary could not be found or run.
    #[error("Transcoder not available at path: {path}")]
    Unavailable { path: PathBuf },

    /// The job was cancelled and the process killed.
    #[error("Transcode cancelled")]
    Cancelled,

    /// Probing the media file failed.
    #[error("Failed to probe media file: {reason}")]
    Probe { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl TranscodeError {
    pub fn probe(reason: impl Into<String>) -> Self {
        Self::Probe {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> TranscodeErrorKind {
        match self {
            Self::Timeout { .. } => TranscodeErrorKind::Timeout,
            Self::NonZeroExit { .. } => TranscodeErrorKind::NonZeroExit,
            Self::Unavailable { .. } => TranscodeErrorKind::Unavailable,
            Self::Cancelled => TranscodeErrorKind::Cancelled,
            Self::Probe { .. } => TranscodeErrorKind::Probe,
            Self::Io(_) => TranscodeErrorKind::Io,
        }
    }
}
