//! Trait definitions for the scheduler module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::job::{Job, JobError, JobReport};

/// Executes one dispatched job to completion.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Runs `job`. Implementations should stop promptly once `cancel` fires.
    async fn execute(&self, job: Job, cancel: CancellationToken) -> Result<JobReport, JobError>;
}
