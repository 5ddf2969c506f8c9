//! Job model shared by the scheduler, the runner and the pipeline.
//!
//! A [`Job`] is one user's single file-processing request. It is created on
//! admission, owned by the scheduler while queued, handed to the runner when
//! dispatched and discarded once its terminal outcome has been reported.

mod error;
mod types;

pub use error::JobError;
pub use types::{CompressionSummary, Job, JobId, JobReport, MediaKind, UserId};
