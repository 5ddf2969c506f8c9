//! Bounded, per-user-serialized job scheduler.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::job::{Job, JobError, JobId, MediaKind, UserId};
use crate::metrics;

use super::config::SchedulerConfig;
use super::error::CancelError;
use super::traits::JobExecutor;
use super::types::{CancelOutcome, JobHandle, JobOutcome, JobState, SchedulerStatus};

/// Totals since startup.
#[derive(Default)]
struct PoolStats {
    total_processed: AtomicU64,
    total_failed: AtomicU64,
    total_cancelled: AtomicU64,
}

impl PoolStats {
    fn record(&self, state: JobState) {
        let counter = match state {
            JobState::Succeeded => &self.total_processed,
            JobState::Failed => &self.total_failed,
            JobState::Cancelled => &self.total_cancelled,
            JobState::Queued | JobState::Running => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A job waiting for a slot, with the channels that report on it.
struct QueuedEntry {
    job: Job,
    state_tx: watch::Sender<JobState>,
    outcome_tx: oneshot::Sender<JobOutcome>,
}

impl QueuedEntry {
    fn finish(self, outcome: JobOutcome) {
        let _ = self.state_tx.send(outcome.state());
        let _ = self.outcome_tx.send(outcome);
    }
}

struct RunningEntry {
    job_id: JobId,
    cancel: CancellationToken,
}

/// `active` holds at most `max_concurrent` entries and at most one per user.
#[derive(Default)]
struct SchedulerState {
    active: HashMap<UserId, RunningEntry>,
    queue: VecDeque<QueuedEntry>,
}

struct Inner {
    config: SchedulerConfig,
    executor: Arc<dyn JobExecutor>,
    state: Mutex<SchedulerState>,
    stats: PoolStats,
}

/// Runs at most `max_concurrent` jobs at once, one per user, FIFO otherwise.
///
/// Jobs are promoted from the queue in submission order, skipping users that
/// already have a running job. Completion of a job promotes the next eligible
/// ones immediately.
#[derive(Clone)]
pub struct ConcurrencyScheduler {
    inner: Arc<Inner>,
}

impl ConcurrencyScheduler {
    pub fn new(config: SchedulerConfig, executor: Arc<dyn JobExecutor>) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            inner: Arc::new(Inner {
                config: SchedulerConfig { max_concurrent },
                executor,
                state: Mutex::new(SchedulerState::default()),
                stats: PoolStats::default(),
            }),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.config.max_concurrent
    }

    /// Queues a job and promotes it if a slot is free.
    pub async fn submit(&self, job: Job) -> JobHandle {
        let (state_tx, state_rx) = watch::channel(JobState::Queued);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let handle = JobHandle::new(job.id.clone(), state_rx, outcome_rx);

        debug!(job_id = %job.id, user_id = %job.user_id, "Job queued");

        let mut state = self.inner.state.lock().await;
        state.queue.push_back(QueuedEntry {
            job,
            state_tx,
            outcome_tx,
        });
        Inner::promote(&self.inner, &mut state);

        handle
    }

    /// Cancels a queued or running job.
    pub async fn cancel(&self, job_id: &JobId) -> Result<CancelOutcome, CancelError> {
        let mut state = self.inner.state.lock().await;

        if let Some(pos) = state.queue.iter().position(|e| &e.job.id == job_id) {
            if let Some(entry) = state.queue.remove(pos) {
                info!(job_id = %job_id, "Queued job cancelled");
                self.inner.stats.record(JobState::Cancelled);
                metrics::JOBS_COMPLETED
                    .with_label_values(&[entry.job.media_kind.as_str(), JobState::Cancelled.as_str()])
                    .inc();
                entry.finish(JobOutcome::Cancelled);
                return Ok(CancelOutcome::Dequeued);
            }
        }

        if let Some(running) = state.active.values().find(|r| &r.job_id == job_id) {
            info!(job_id = %job_id, "Cancellation requested for running job");
            running.cancel.cancel();
            return Ok(CancelOutcome::Requested);
        }

        Err(CancelError::NotFound(job_id.clone()))
    }

    /// Cancels everything: queued jobs are dropped, running jobs signalled.
    pub async fn cancel_all(&self) -> usize {
        let mut state = self.inner.state.lock().await;
        let queued: Vec<_> = state.queue.drain(..).collect();
        let count = queued.len() + state.active.len();

        for entry in queued {
            self.inner.stats.record(JobState::Cancelled);
            metrics::JOBS_COMPLETED
                .with_label_values(&[entry.job.media_kind.as_str(), JobState::Cancelled.as_str()])
                .inc();
            entry.finish(JobOutcome::Cancelled);
        }
        for running in state.active.values() {
            running.cancel.cancel();
        }

        if count > 0 {
            info!(count, "Cancelled all jobs");
        }
        count
    }

    /// Ids of the jobs currently holding a slot.
    pub async fn running_jobs(&self) -> Vec<JobId> {
        let state = self.inner.state.lock().await;
        state.active.values().map(|r| r.job_id.clone()).collect()
    }

    /// State of a queued or running job. Finished jobs are forgotten.
    pub async fn job_state(&self, job_id: &JobId) -> Option<JobState> {
        let state = self.inner.state.lock().await;
        if state.queue.iter().any(|e| &e.job.id == job_id) {
            Some(JobState::Queued)
        } else if state.active.values().any(|r| &r.job_id == job_id) {
            Some(JobState::Running)
        } else {
            None
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        let state = self.inner.state.lock().await;
        SchedulerStatus {
            active_jobs: state.active.len(),
            queued_jobs: state.queue.len(),
            max_concurrent: self.inner.config.max_concurrent,
            total_processed: self.inner.stats.total_processed.load(Ordering::Relaxed),
            total_failed: self.inner.stats.total_failed.load(Ordering::Relaxed),
            total_cancelled: self.inner.stats.total_cancelled.load(Ordering::Relaxed),
        }
    }
}

impl Inner {
    /// Moves eligible jobs from the queue to running while slots are free.
    fn promote(inner: &Arc<Inner>, state: &mut SchedulerState) {
        while state.active.len() < inner.config.max_concurrent {
            let active = &state.active;
            let Some(pos) = state
                .queue
                .iter()
                .position(|e| !active.contains_key(&e.job.user_id))
            else {
                break;
            };
            let Some(entry) = state.queue.remove(pos) else {
                break;
            };

            let cancel = CancellationToken::new();
            state.active.insert(
                entry.job.user_id,
                RunningEntry {
                    job_id: entry.job.id.clone(),
                    cancel: cancel.clone(),
                },
            );
            let _ = entry.state_tx.send(JobState::Running);

            debug!(
                job_id = %entry.job.id,
                user_id = %entry.job.user_id,
                active = state.active.len(),
                queued = state.queue.len(),
                "Job promoted"
            );

            Self::dispatch(Arc::clone(inner), entry, cancel);
        }
    }

    fn dispatch(inner: Arc<Inner>, entry: QueuedEntry, cancel: CancellationToken) {
        tokio::spawn(async move {
            let QueuedEntry {
                job,
                state_tx,
                outcome_tx,
            } = entry;
            let job_id = job.id.clone();
            let user_id = job.user_id;
            let kind = job.media_kind;

            // Run in a nested task so a panic becomes this job's failure.
            let executor = Arc::clone(&inner.executor);
            let token = cancel.clone();
            let joined = tokio::spawn(async move { executor.execute(job, token).await }).await;

            let outcome = match joined {
                Ok(Ok(report)) => JobOutcome::Succeeded(report),
                Ok(Err(e)) if cancel.is_cancelled() || e.is_cancellation() => JobOutcome::Cancelled,
                Ok(Err(e)) => JobOutcome::Failed(e),
                Err(join_error) => {
                    error!(job_id = %job_id, error = %join_error, "Job task aborted");
                    JobOutcome::Failed(JobError::Internal(format!(
                        "job task aborted: {}",
                        join_error
                    )))
                }
            };

            Self::complete(
                &inner,
                user_id,
                &job_id,
                kind,
                QueuedOutcome {
                    outcome,
                    state_tx,
                    outcome_tx,
                },
            )
            .await;
        });
    }

    async fn complete(
        inner: &Arc<Inner>,
        user_id: UserId,
        job_id: &JobId,
        kind: MediaKind,
        finished: QueuedOutcome,
    ) {
        let mut state = inner.state.lock().await;

        match state.active.get(&user_id) {
            Some(running) if &running.job_id == job_id => {
                state.active.remove(&user_id);
            }
            _ => warn!(
                job_id = %job_id,
                user_id = %user_id,
                "Finished job was not registered as running"
            ),
        }

        let terminal = finished.outcome.state();
        inner.stats.record(terminal);
        metrics::JOBS_COMPLETED
            .with_label_values(&[kind.as_str(), terminal.as_str()])
            .inc();

        match &finished.outcome {
            JobOutcome::Failed(e) => {
                warn!(job_id = %job_id, user_id = %user_id, error = %e, "Job failed")
            }
            _ => debug!(job_id = %job_id, user_id = %user_id, state = %terminal, "Job finished"),
        }

        let _ = finished.state_tx.send(terminal);
        let _ = finished.outcome_tx.send(finished.outcome);

        Self::promote(inner, &mut state);
    }
}

/// Channels of a dispatched job together with its outcome.
struct QueuedOutcome {
    outcome: JobOutcome,
    state_tx: watch::Sender<JobState>,
    outcome_tx: oneshot::Sender<JobOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{CompressionSummary, JobReport};
    use crate::preset::PresetLevel;
    use crate::transcoder::{DerivedMetadata, EncodeMode};
    use crate::transport::InputDescriptor;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Sleeps per job while tracking overlap.
    #[derive(Default)]
    struct SleepExecutor {
        delay_ms: u64,
        current: AtomicUsize,
        peak: AtomicUsize,
        running_users: std::sync::Mutex<HashSet<UserId>>,
        overlap: std::sync::atomic::AtomicBool,
        started: std::sync::Mutex<Vec<UserId>>,
    }

    impl SleepExecutor {
        fn new(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay_ms,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl JobExecutor for SleepExecutor {
        async fn execute(&self, job: Job, cancel: CancellationToken) -> Result<JobReport, JobError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if !self.running_users.lock().unwrap().insert(job.user_id) {
                self.overlap.store(true, Ordering::SeqCst);
            }
            self.started.lock().unwrap().push(job.user_id);

            let result = tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(self.delay_ms)) => Ok(report(&job)),
                _ = cancel.cancelled() => Err(JobError::Cancelled),
            };

            self.running_users.lock().unwrap().remove(&job.user_id);
            self.current.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    struct PanicExecutor;

    #[async_trait]
    impl JobExecutor for PanicExecutor {
        async fn execute(&self, job: Job, _cancel: CancellationToken) -> Result<JobReport, JobError> {
            if job.user_id == UserId(666) {
                panic!("executor bug");
            }
            Ok(report(&job))
        }
    }

    fn report(job: &Job) -> JobReport {
        JobReport {
            job_id: job.id.clone(),
            user_id: job.user_id,
            media_kind: job.media_kind,
            preset: PresetLevel::Medium,
            summary: CompressionSummary::new(100, 50),
            metadata: DerivedMetadata::default(),
            mode: EncodeMode::Encoded,
            elapsed_ms: 0,
        }
    }

    fn job(user: i64) -> Job {
        Job::new(
            UserId(user),
            MediaKind::Audio,
            InputDescriptor::new("in.ogg", 4096),
            "auto",
        )
    }

    #[tokio::test]
    async fn test_never_exceeds_max_concurrent() {
        let executor = SleepExecutor::new(40);
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(2),
            executor.clone(),
        );

        let mut handles = Vec::new();
        for user in 0..6 {
            handles.push(scheduler.submit(job(user)).await);
        }

        let status = scheduler.status().await;
        assert_eq!(status.active_jobs, 2);
        assert_eq!(status.queued_jobs, 4);

        for handle in handles {
            assert!(matches!(handle.wait().await, JobOutcome::Succeeded(_)));
        }
        assert_eq!(executor.peak.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.status().await.total_processed, 6);
    }

    #[tokio::test]
    async fn test_same_user_jobs_never_overlap() {
        let executor = SleepExecutor::new(20);
        let scheduler = ConcurrencyScheduler::new(SchedulerConfig::default(), executor.clone());

        let mut handles = Vec::new();
        for _ in 0..4 {
            handles.push(scheduler.submit(job(1)).await);
        }
        assert_eq!(scheduler.status().await.active_jobs, 1);

        for handle in handles {
            handle.wait().await;
        }
        assert!(!executor.overlap.load(Ordering::SeqCst));
        assert_eq!(executor.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fifo_skips_busy_user() {
        let executor = SleepExecutor::new(30);
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(2),
            executor.clone(),
        );

        // User 1 twice, then user 2: the second user-1 job must not block user 2.
        let a = scheduler.submit(job(1)).await;
        let b = scheduler.submit(job(1)).await;
        let c = scheduler.submit(job(2)).await;

        assert_eq!(a.state(), JobState::Running);
        assert_eq!(b.state(), JobState::Queued);
        assert_eq!(c.state(), JobState::Running);

        for handle in [a, b, c] {
            handle.wait().await;
        }
        assert_eq!(
            *executor.started.lock().unwrap(),
            vec![UserId(1), UserId(2), UserId(1)]
        );
    }

    #[tokio::test]
    async fn test_cancel_queued_job() {
        let executor = SleepExecutor::new(50);
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(1),
            executor.clone(),
        );

        let first = scheduler.submit(job(1)).await;
        let second = scheduler.submit(job(2)).await;
        let second_id = second.id().clone();

        assert_eq!(scheduler.job_state(&second_id).await, Some(JobState::Queued));
        assert_eq!(
            scheduler.cancel(&second_id).await,
            Ok(CancelOutcome::Dequeued)
        );
        assert!(matches!(second.wait().await, JobOutcome::Cancelled));
        assert_eq!(scheduler.job_state(&second_id).await, None);

        assert!(matches!(first.wait().await, JobOutcome::Succeeded(_)));
        assert_eq!(*executor.started.lock().unwrap(), vec![UserId(1)]);
    }

    #[tokio::test]
    async fn test_cancel_running_job() {
        let executor = SleepExecutor::new(10_000);
        let scheduler = ConcurrencyScheduler::new(SchedulerConfig::default(), executor.clone());

        let handle = scheduler.submit(job(1)).await;
        let id = handle.id().clone();
        assert_eq!(scheduler.job_state(&id).await, Some(JobState::Running));

        assert_eq!(scheduler.cancel(&id).await, Ok(CancelOutcome::Requested));
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .unwrap();
        assert!(matches!(outcome, JobOutcome::Cancelled));
        assert_eq!(scheduler.status().await.total_cancelled, 1);
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let scheduler = ConcurrencyScheduler::new(SchedulerConfig::default(), SleepExecutor::new(1));
        let id = JobId::new();
        assert_eq!(scheduler.cancel(&id).await, Err(CancelError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_panic_fails_only_that_job() {
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(1),
            Arc::new(PanicExecutor),
        );

        let bad = scheduler.submit(job(666)).await;
        let good = scheduler.submit(job(2)).await;

        match bad.wait().await {
            JobOutcome::Failed(JobError::Internal(msg)) => assert!(msg.contains("aborted")),
            other => panic!("expected internal failure, got {:?}", other),
        }
        assert!(matches!(good.wait().await, JobOutcome::Succeeded(_)));

        let status = scheduler.status().await;
        assert_eq!(status.total_failed, 1);
        assert_eq!(status.active_jobs, 0);
    }

    #[tokio::test]
    async fn test_state_transitions_observed() {
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(1),
            SleepExecutor::new(50),
        );
        let first = scheduler.submit(job(1)).await;
        let second = scheduler.submit(job(2)).await;
        let mut states = second.subscribe();
        assert_eq!(*states.borrow(), JobState::Queued);

        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), JobState::Running);

        first.wait().await;
        assert!(matches!(second.wait().await, JobOutcome::Succeeded(_)));
        assert_eq!(*states.borrow(), JobState::Succeeded);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let scheduler = ConcurrencyScheduler::new(
            SchedulerConfig::default().with_max_concurrent(1),
            SleepExecutor::new(10_000),
        );
        let cancelled = metrics::JOBS_COMPLETED.with_label_values(&["audio", "cancelled"]);
        let before = cancelled.get();
        let running = scheduler.submit(job(1)).await;
        let queued = scheduler.submit(job(2)).await;
        assert_eq!(scheduler.running_jobs().await, vec![running.id().clone()]);

        assert_eq!(scheduler.cancel_all().await, 2);
        assert!(matches!(queued.wait().await, JobOutcome::Cancelled));
        assert!(matches!(running.wait().await, JobOutcome::Cancelled));

        // Both the drained and the interrupted job are counted.
        assert!(cancelled.get() >= before + 2);
        assert!(scheduler.running_jobs().await.is_empty());
    }
}
