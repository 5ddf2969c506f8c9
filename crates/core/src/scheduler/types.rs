//! Types for the scheduler module.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{oneshot, watch};

use crate::job::{JobError, JobId, JobReport};

/// Lifecycle of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a job, reported exactly once.
#[derive(Debug)]
pub enum JobOutcome {
    Succeeded(JobReport),
    Failed(JobError),
    Cancelled,
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Succeeded(_) => JobState::Succeeded,
            Self::Failed(_) => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }
}

/// Caller's view of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    state_rx: watch::Receiver<JobState>,
    outcome_rx: oneshot::Receiver<JobOutcome>,
}

impl JobHandle {
    pub(crate) fn new(
        id: JobId,
        state_rx: watch::Receiver<JobState>,
        outcome_rx: oneshot::Receiver<JobOutcome>,
    ) -> Self {
        Self {
            id,
            state_rx,
            outcome_rx,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Latest known state.
    pub fn state(&self) -> JobState {
        *self.state_rx.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state_rx.clone()
    }

    /// Waits for the terminal outcome.
    pub async fn wait(self) -> JobOutcome {
        self.outcome_rx.await.unwrap_or_else(|_| {
            JobOutcome::Failed(JobError::Internal(
                "job ended without reporting an outcome".to_string(),
            ))
        })
    }
}

/// Result of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    /// The job was still queued and has been removed.
    Dequeued,
    /// The job is running; cancellation was signalled.
    Requested,
}

/// Snapshot of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub active_jobs: usize,
    pub queued_jobs: usize,
    pub max_concurrent: usize,
    pub total_processed: u64,
    pub total_failed: u64,
    pub total_cancelled: u64,
}
