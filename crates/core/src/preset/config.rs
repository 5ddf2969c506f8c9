//! Preset configuration.

use serde::{Deserialize, Serialize};

use crate::job::MediaKind;

use super::types::PresetLevel;

const MIB: u64 = 1024 * 1024;

/// Inclusive upper bounds (bytes) used by `auto` selection.
///
/// Inputs above `low_max_bytes` resolve to `ultra_low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoThresholds {
    pub ultra_high_max_bytes: u64,
    pub high_max_bytes: u64,
    pub medium_max_bytes: u64,
    pub low_max_bytes: u64,
}

impl AutoThresholds {
    /// Picks a level for an input of the given size.
    pub fn select(&self, size_bytes: u64) -> PresetLevel {
        if size_bytes <= self.ultra_high_max_bytes {
            PresetLevel::UltraHigh
        } else if size_bytes <= self.high_max_bytes {
            PresetLevel::High
        } else if size_bytes <= self.medium_max_bytes {
            PresetLevel::Medium
        } else if size_bytes <= self.low_max_bytes {
            PresetLevel::Low
        } else {
            PresetLevel::UltraLow
        }
    }

    /// Thresholds must be strictly increasing.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [
            self.ultra_high_max_bytes,
            self.high_max_bytes,
            self.medium_max_bytes,
            self.low_max_bytes,
        ];
        if bounds.windows(2).all(|w| w[0] < w[1]) {
            Ok(())
        } else {
            Err(format!("thresholds must be strictly increasing, got {:?}", bounds))
        }
    }
}

fn default_audio_thresholds() -> AutoThresholds {
    AutoThresholds {
        ultra_high_max_bytes: 5 * MIB,
        high_max_bytes: 15 * MIB,
        medium_max_bytes: 40 * MIB,
        low_max_bytes: 100 * MIB,
    }
}

fn default_video_thresholds() -> AutoThresholds {
    AutoThresholds {
        ultra_high_max_bytes: 25 * MIB,
        high_max_bytes: 100 * MIB,
        medium_max_bytes: 300 * MIB,
        low_max_bytes: 600 * MIB,
    }
}

/// Configuration for preset resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default = "default_audio_thresholds")]
    pub audio_thresholds: AutoThresholds,
    #[serde(default = "default_video_thresholds")]
    pub video_thresholds: AutoThresholds,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            audio_thresholds: default_audio_thresholds(),
            video_thresholds: default_video_thresholds(),
        }
    }
}

impl PresetConfig {
    pub fn thresholds(&self, kind: MediaKind) -> &AutoThresholds {
        match kind {
            MediaKind::Audio => &self.audio_thresholds,
            MediaKind::Video => &self.video_thresholds,
        }
    }

    pub fn with_audio_thresholds(mut self, thresholds: AutoThresholds) -> Self {
        self.audio_thresholds = thresholds;
        self
    }

    pub fn with_video_thresholds(mut self, thresholds: AutoThresholds) -> Self {
        self.video_thresholds = thresholds;
        self
    }
}
