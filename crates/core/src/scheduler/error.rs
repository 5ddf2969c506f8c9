//! Error types for the scheduler module.

use thiserror::Error;

use crate::job::JobId;

/// Errors from cancellation requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    /// No queued or running job has this id.
    #[error("Job not found: {0}")]
    NotFound(JobId),
}
