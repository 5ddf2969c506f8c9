//! Job runner: drives one admitted job from fetch to delivery.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::{CompressionSummary, Job, JobError, JobReport, MediaKind};
use crate::metrics;
use crate::preset::PresetResolver;
use crate::scheduler::JobExecutor;
use crate::stats::StatsRecorder;
use crate::transcoder::{TranscodeRequest, Transcoder, TranscoderConfig};
use crate::transport::{DeliveryMetadata, OutputDescriptor, Transport};

use super::messages;
use super::workspace::{JobWorkspace, WorkspaceConfig};

/// Settings the runner needs from the wider configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub workspace_root: PathBuf,
    pub audio_timeout: Duration,
    pub video_timeout: Duration,
}

impl RunnerConfig {
    pub fn new(workspace: &WorkspaceConfig, transcoder: &TranscoderConfig) -> Self {
        Self {
            workspace_root: workspace.root_dir.clone(),
            audio_timeout: transcoder.timeout_for(MediaKind::Audio),
            video_timeout: transcoder.timeout_for(MediaKind::Video),
        }
    }

    pub fn timeout_for(&self, kind: MediaKind) -> Duration {
        match kind {
            MediaKind::Audio => self.audio_timeout,
            MediaKind::Video => self.video_timeout,
        }
    }
}

/// Runs jobs dispatched by the scheduler.
///
/// Every job gets a private [`JobWorkspace`] that is removed when the run
/// ends, whatever the outcome. Failures are reported to the user with a
/// summarized message; full detail only goes to the log.
pub struct JobRunner {
    config: RunnerConfig,
    resolver: PresetResolver,
    transcoder: Arc<dyn Transcoder>,
    transport: Arc<dyn Transport>,
    stats: Arc<dyn StatsRecorder>,
}

impl JobRunner {
    pub fn new(
        config: RunnerConfig,
        resolver: PresetResolver,
        transcoder: Arc<dyn Transcoder>,
        transport: Arc<dyn Transport>,
        stats: Arc<dyn StatsRecorder>,
    ) -> Self {
        Self {
            config,
            resolver,
            transcoder,
            transport,
            stats,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    async fn run(&self, job: &Job, cancel: &CancellationToken) -> Result<JobReport, JobError> {
        let started = Instant::now();
        let kind = job.media_kind;

        let workspace = JobWorkspace::create(&self.config.workspace_root, &job.id)
            .await
            .map_err(JobError::Workspace)?;
        debug!("Job {} workspace at {}", job.id, workspace.path().display());

        let notice = messages::processing(
            kind,
            job.input.display_name(),
            job.input.size_bytes,
            &job.requested_preset,
        );
        if let Err(e) = self.transport.notify(job.user_id, &notice).await {
            debug!("Processing notice for job {} not sent: {}", job.id, e);
        }

        let input_path = workspace.input_path(&job.input);
        tokio::select! {
            _ = cancel.cancelled() => return Err(JobError::Cancelled),
            fetched = self.transport.fetch(&job.input, &input_path) => {
                let bytes = fetched?;
                debug!("Job {} fetched {} bytes", job.id, bytes);
            }
        }

        let original_size = tokio::fs::metadata(&input_path)
            .await
            .map_err(JobError::Workspace)?
            .len();

        let profile = self
            .resolver
            .resolve(kind, &job.requested_preset, original_size)?;
        debug!(
            "Job {} resolved preset {:?} to {}",
            job.id, job.requested_preset, profile.level
        );

        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let request = TranscodeRequest {
            job_id: job.id.clone(),
            input_path: input_path.clone(),
            output_path: workspace.output_path(&job.input, &profile),
            profile: profile.clone(),
            timeout: self.config.timeout_for(kind),
        };

        let transcode_started = Instant::now();
        let result = self.transcoder.transcode(request, cancel.clone()).await;
        let result_label = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        metrics::TRANSCODE_DURATION
            .with_label_values(&[kind.as_str(), result_label])
            .observe(transcode_started.elapsed().as_secs_f64());
        let output = result?;

        let summary = CompressionSummary::new(original_size, output.output_size_bytes);
        let caption = messages::result(kind, &profile, &summary, output.mode);

        let file_name = output
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}_compressed", job.input.stem()));
        let delivered = OutputDescriptor {
            path: output.output_path.clone(),
            file_name,
            size_bytes: output.output_size_bytes,
            media_kind: kind,
        };
        let metadata = DeliveryMetadata {
            job_id: job.id.clone(),
            preset: profile.level,
            summary,
            derived: output.metadata.clone(),
            mode: output.mode,
            caption,
        };
        self.transport
            .deliver(job.user_id, &delivered, &metadata)
            .await?;

        self.stats
            .increment(job.user_id, kind, original_size, output.output_size_bytes)
            .await;
        metrics::BYTES_SAVED
            .with_label_values(&[kind.as_str()])
            .inc_by(summary.space_saved);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Job {} for user {} done: {} -> {} bytes ({:.1}% saved) at {} in {}ms",
            job.id,
            job.user_id,
            original_size,
            output.output_size_bytes,
            summary.ratio_percent,
            profile.level,
            elapsed_ms
        );

        Ok(JobReport {
            job_id: job.id.clone(),
            user_id: job.user_id,
            media_kind: kind,
            preset: profile.level,
            summary,
            metadata: output.metadata,
            mode: output.mode,
            elapsed_ms,
        })
    }
}

#[async_trait]
impl JobExecutor for JobRunner {
    async fn execute(&self, job: Job, cancel: CancellationToken) -> Result<JobReport, JobError> {
        match self.run(&job, &cancel).await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(
                    "Job {} for user {} failed ({}): {}",
                    job.id,
                    job.user_id,
                    e.label(),
                    e
                );
                if let Err(notify_err) = self
                    .transport
                    .notify(job.user_id, &messages::failure(&e))
                    .await
                {
                    warn!(
                        "Failed to notify user {} about job {}: {}",
                        job.user_id, job.id, notify_err
                    );
                }
                Err(e)
            }
        }
    }
}
