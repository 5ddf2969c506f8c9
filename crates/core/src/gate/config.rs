//! Admission limits configuration.

use serde::{Deserialize, Serialize};

use crate::job::MediaKind;

fn default_max_audio_size_bytes() -> u64 {
    500 * 1024 * 1024
}

fn default_max_video_size_bytes() -> u64 {
    900 * 1024 * 1024
}

fn default_min_file_size_bytes() -> u64 {
    1024
}

fn default_max_files_per_hour() -> u32 {
    10
}

fn default_max_files_per_day() -> u32 {
    50
}

/// Size ceilings and per-user rate caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_audio_size_bytes")]
    pub max_audio_size_bytes: u64,
    #[serde(default = "default_max_video_size_bytes")]
    pub max_video_size_bytes: u64,
    /// Smaller files are rejected as empty or truncated.
    #[serde(default = "default_min_file_size_bytes")]
    pub min_file_size_bytes: u64,
    #[serde(default = "default_max_files_per_hour")]
    pub max_files_per_hour: u32,
    #[serde(default = "default_max_files_per_day")]
    pub max_files_per_day: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_audio_size_bytes: default_max_audio_size_bytes(),
            max_video_size_bytes: default_max_video_size_bytes(),
            min_file_size_bytes: default_min_file_size_bytes(),
            max_files_per_hour: default_max_files_per_hour(),
            max_files_per_day: default_max_files_per_day(),
        }
    }
}

impl LimitsConfig {
    pub fn max_size_for(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Audio => self.max_audio_size_bytes,
            MediaKind::Video => self.max_video_size_bytes,
        }
    }

    pub fn with_rate_caps(mut self, per_hour: u32, per_day: u32) -> Self {
        self.max_files_per_hour = per_hour;
        self.max_files_per_day = per_day;
        self
    }

    pub fn with_size_bounds(mut self, min: u64, max_audio: u64, max_video: u64) -> Self {
        self.min_file_size_bytes = min;
        self.max_audio_size_bytes = max_audio;
        self.max_video_size_bytes = max_video;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LimitsConfig::default();
        assert_eq!(config.max_size_for(MediaKind::Audio), 500 * 1024 * 1024);
        assert_eq!(config.max_size_for(MediaKind::Video), 900 * 1024 * 1024);
        assert_eq!(config.max_files_per_hour, 10);
        assert_eq!(config.max_files_per_day, 50);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: LimitsConfig = toml::from_str("").unwrap();
        assert_eq!(config, LimitsConfig::default());
    }
}
