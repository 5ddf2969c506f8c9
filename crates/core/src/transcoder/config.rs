//! Configuration for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::job::MediaKind;

/// What to do with audio when the transcoder binary is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    /// Fail the job with `Unavailable`.
    Fail,
    /// Deliver the input unchanged and log a warning.
    Copy,
}

/// Configuration for the FFmpeg-based transcoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Encoder threads per job (`-threads`).
    #[serde(default = "default_thread_cap")]
    pub thread_cap: u32,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Hard ceiling for one audio transcode.
    #[serde(default = "default_audio_timeout")]
    pub audio_timeout_secs: u64,

    /// Hard ceiling for one video transcode.
    #[serde(default = "default_video_timeout")]
    pub video_timeout_secs: u64,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Stderr lines kept for failure diagnostics.
    #[serde(default = "default_diagnostic_lines")]
    pub diagnostic_lines: usize,

    #[serde(default = "default_unavailable_audio")]
    pub unavailable_audio: UnavailablePolicy,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_thread_cap() -> u32 {
    2
}

fn default_log_level() -> String {
    "warning".to_string()
}

fn default_audio_timeout() -> u64 {
    300
}

fn default_video_timeout() -> u64 {
    600
}

fn default_probe_timeout() -> u64 {
    30
}

fn default_diagnostic_lines() -> usize {
    20
}

fn default_unavailable_audio() -> UnavailablePolicy {
    UnavailablePolicy::Copy
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            thread_cap: default_thread_cap(),
            ffmpeg_log_level: default_log_level(),
            audio_timeout_secs: default_audio_timeout(),
            video_timeout_secs: default_video_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            diagnostic_lines: default_diagnostic_lines(),
            unavailable_audio: default_unavailable_audio(),
        }
    }
}

impl TranscoderConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    pub fn with_unavailable_audio(mut self, policy: UnavailablePolicy) -> Self {
        self.unavailable_audio = policy;
        self
    }

    pub fn with_timeouts(mut self, audio_secs: u64, video_secs: u64) -> Self {
        self.audio_timeout_secs = audio_secs;
        self.video_timeout_secs = video_secs;
        self
    }

    /// Per-kind timeout ceiling.
    pub fn timeout_for(&self, kind: MediaKind) -> Duration {
        Duration::from_secs(match kind {
            MediaKind::Audio => self.audio_timeout_secs,
            MediaKind::Video => self.video_timeout_secs,
        })
    }
}
