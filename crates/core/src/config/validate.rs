use super::{types::Config, ConfigError};

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Slack between the longest job timeout and the artifact sweep age, covering
/// fetch and delivery around the transcode.
const ARTIFACT_AGE_MARGIN_SECS: u64 = 300;

/// Validate configuration
///
/// Checks the cross-field constraints serde cannot express: non-zero port,
/// consistent size bounds and rate caps, at least one job slot, a sane
/// thread cap, positive timeouts and increasing auto thresholds. Leftover
/// artifacts may only be swept once no running job can still own them.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let limits = &config.limits;
    if limits.min_file_size_bytes > limits.max_audio_size_bytes
        || limits.min_file_size_bytes > limits.max_video_size_bytes
    {
        return Err(invalid(
            "limits.min_file_size_bytes must not exceed the max sizes",
        ));
    }
    if limits.max_files_per_hour == 0 || limits.max_files_per_day == 0 {
        return Err(invalid("limits: rate caps must be at least 1"));
    }
    if limits.max_files_per_hour > limits.max_files_per_day {
        return Err(invalid(
            "limits.max_files_per_hour must not exceed max_files_per_day",
        ));
    }

    if config.scheduler.max_concurrent == 0 {
        return Err(invalid("scheduler.max_concurrent must be at least 1"));
    }

    let transcoder = &config.transcoder;
    if !(1..=8).contains(&transcoder.thread_cap) {
        return Err(invalid("transcoder.thread_cap must be between 1 and 8"));
    }
    if transcoder.audio_timeout_secs == 0
        || transcoder.video_timeout_secs == 0
        || transcoder.probe_timeout_secs == 0
    {
        return Err(invalid("transcoder timeouts must be positive"));
    }

    config
        .presets
        .audio_thresholds
        .validate()
        .map_err(|e| invalid(format!("presets.audio_thresholds: {}", e)))?;
    config
        .presets
        .video_thresholds
        .validate()
        .map_err(|e| invalid(format!("presets.video_thresholds: {}", e)))?;

    if config.workspace.sweep_interval_secs == 0 {
        return Err(invalid("workspace.sweep_interval_secs must be positive"));
    }
    let longest_job = transcoder.audio_timeout_secs.max(transcoder.video_timeout_secs);
    let min_age = longest_job.saturating_add(ARTIFACT_AGE_MARGIN_SECS);
    if config.workspace.max_artifact_age_secs < min_age {
        return Err(invalid(format!(
            "workspace.max_artifact_age_secs must be at least {} (longest transcoder timeout plus {}s)",
            min_age, ARTIFACT_AGE_MARGIN_SECS
        )));
    }

    Ok(())
}
