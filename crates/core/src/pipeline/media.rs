//! The composed pipeline.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::gate::{LimitsConfig, SizeAndRateGate};
use crate::job::{Job, JobId, MediaKind, UserId};
use crate::preset::{PresetResolver, RequestedPreset};
use crate::runner::{messages, JobRunner, MaintenanceTask, RunnerConfig};
use crate::scheduler::{CancelError, CancelOutcome, ConcurrencyScheduler, JobHandle, JobState};
use crate::stats::StatsRecorder;
use crate::store::{PreferenceStore, UserPreferences};
use crate::transcoder::Transcoder;
use crate::transport::Transport;

use super::error::SubmitError;
use super::types::{FileEvent, PipelineStatus};

/// Admission, preferences, scheduling and maintenance behind one handle.
pub struct MediaPipeline {
    gate: Arc<SizeAndRateGate>,
    preferences: Arc<PreferenceStore>,
    scheduler: ConcurrencyScheduler,
    maintenance: MaintenanceTask,
    transcoder: Arc<dyn Transcoder>,
    transport: Arc<dyn Transport>,
    running: AtomicBool,
}

impl MediaPipeline {
    /// Build every component from `config`. The pipeline starts stopped.
    pub fn new(
        config: &Config,
        transcoder: Arc<dyn Transcoder>,
        transport: Arc<dyn Transport>,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        let gate = Arc::new(SizeAndRateGate::new(config.limits.clone()));
        let preferences = Arc::new(PreferenceStore::new(config.preferences.clone()));

        let runner = JobRunner::new(
            RunnerConfig::new(&config.workspace, &config.transcoder),
            PresetResolver::new(config.presets.clone()),
            Arc::clone(&transcoder),
            Arc::clone(&transport),
            stats,
        );
        let scheduler = ConcurrencyScheduler::new(config.scheduler.clone(), Arc::new(runner));
        let maintenance = MaintenanceTask::new(
            config.workspace.clone(),
            Arc::clone(&gate),
            Arc::clone(&preferences),
        )
        .with_scheduler(scheduler.clone());

        Self {
            gate,
            preferences,
            scheduler,
            maintenance,
            transcoder,
            transport,
            running: AtomicBool::new(false),
        }
    }

    /// Start accepting files and run the maintenance loop.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Pipeline already running");
            return;
        }

        info!(
            "Starting media pipeline (max {} concurrent jobs, transcoder: {})",
            self.scheduler.max_concurrent(),
            self.transcoder.name()
        );
        self.maintenance.start().await;
    }

    /// Stop accepting files and stop maintenance. Jobs already admitted keep
    /// running; use [`MediaPipeline::cancel_all`] to abort them.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Pipeline not running");
            return;
        }

        info!("Stopping media pipeline");
        self.maintenance.stop().await;
        info!("Media pipeline stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Admit a file and queue it.
    ///
    /// A rejected file is reported to the user through the transport before
    /// the error is returned.
    pub async fn submit(&self, event: FileEvent) -> Result<JobHandle, SubmitError> {
        if !self.is_running() {
            return Err(SubmitError::NotRunning);
        }

        let FileEvent {
            user_id,
            media_kind,
            input,
            preset,
        } = event;

        let admission = self
            .gate
            .admit_at(user_id, media_kind, input.size_bytes, Utc::now());
        let admission = match admission {
            Ok(admission) => admission,
            Err(rejected) => {
                warn!(
                    "Rejected {} from user {} ({} bytes): {}",
                    media_kind, user_id, input.size_bytes, rejected
                );
                let text = messages::rejection(&rejected);
                if let Err(e) = self.transport.notify(user_id, &text).await {
                    warn!("Failed to notify user {} about rejection: {}", user_id, e);
                }
                return Err(SubmitError::Rejected(rejected));
            }
        };

        let preset = preset.unwrap_or_else(|| self.preferences.get(user_id, media_kind).into());
        let job = Job::new(user_id, media_kind, input, preset);
        debug!(
            "Admitted job {} for user {} ({} this hour, {} today)",
            job.id, user_id, admission.hourly_count, admission.daily_count
        );

        Ok(self.scheduler.submit(job).await)
    }

    pub async fn cancel(&self, job_id: &JobId) -> Result<CancelOutcome, CancelError> {
        self.scheduler.cancel(job_id).await
    }

    /// Cancel every queued and running job. Returns how many were affected.
    pub async fn cancel_all(&self) -> usize {
        self.scheduler.cancel_all().await
    }

    /// State of a queued or running job. Finished jobs are not tracked.
    pub async fn job_state(&self, job_id: &JobId) -> Option<JobState> {
        self.scheduler.job_state(job_id).await
    }

    pub async fn status(&self) -> PipelineStatus {
        PipelineStatus {
            running: self.is_running(),
            scheduler: self.scheduler.status().await,
        }
    }

    pub fn set_preference(&self, user_id: UserId, kind: MediaKind, preset: RequestedPreset) {
        self.preferences.set(user_id, kind, preset);
    }

    pub fn preferences(&self, user_id: UserId) -> UserPreferences {
        self.preferences.all(user_id)
    }

    /// Files a user has submitted in the last hour and day.
    pub fn usage(&self, user_id: UserId) -> (u32, u32) {
        self.gate.usage(user_id, Utc::now())
    }

    pub fn limits(&self) -> &LimitsConfig {
        self.gate.config()
    }

    pub async fn is_transcoder_available(&self) -> bool {
        self.transcoder.is_available().await
    }
}
