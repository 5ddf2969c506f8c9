//! Error types for the pipeline module.

use thiserror::Error;

use crate::gate::AdmissionRejected;

/// Why an inbound file event was not turned into a job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// The gate turned the file away. The user has been told why.
    #[error("Rejected: {0}")]
    Rejected(AdmissionRejected),

    /// The pipeline is stopped and not accepting work.
    #[error("Pipeline is not running")]
    NotRunning,
}

impl From<AdmissionRejected> for SubmitError {
    fn from(rejected: AdmissionRejected) -> Self {
        Self::Rejected(rejected)
    }
}
