//! Built-in profile table.

use crate::job::MediaKind;

use super::types::{
    AudioCodec, AudioParams, Container, PresetLevel, PresetProfile, VideoCodec, VideoParams,
};

/// Immutable lookup of profiles by (media kind, level).
#[derive(Debug, Clone)]
pub struct PresetTable {
    profiles: Vec<PresetProfile>,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetTable {
    /// Creates a table from explicit profiles.
    pub fn new(profiles: Vec<PresetProfile>) -> Self {
        Self { profiles }
    }

    /// The canonical five-level table for audio and video.
    pub fn builtin() -> Self {
        let mut profiles = Vec::with_capacity(10);

        // (level, bitrate, channels)
        let audio = [
            (PresetLevel::UltraHigh, 128, 2),
            (PresetLevel::High, 96, 2),
            (PresetLevel::Medium, 64, 2),
            (PresetLevel::Low, 32, 1),
            (PresetLevel::UltraLow, 24, 1),
        ];
        for (level, bitrate_kbps, channels) in audio {
            profiles.push(PresetProfile {
                kind: MediaKind::Audio,
                level,
                container: Container::Mp3,
                audio: AudioParams {
                    codec: AudioCodec::Mp3,
                    bitrate_kbps,
                    channels,
                    sample_rate_hz: None,
                },
                video: None,
            });
        }

        // (level, height, fps, crf, audio bitrate)
        let video = [
            (PresetLevel::UltraHigh, 720, 30, 21, 96),
            (PresetLevel::High, 480, 25, 23, 64),
            (PresetLevel::Medium, 360, 20, 28, 48),
            (PresetLevel::Low, 270, 15, 32, 32),
            (PresetLevel::UltraLow, 240, 12, 35, 24),
        ];
        for (level, height, fps, crf, audio_kbps) in video {
            profiles.push(PresetProfile {
                kind: MediaKind::Video,
                level,
                container: Container::Mp4,
                audio: AudioParams {
                    codec: AudioCodec::Aac,
                    bitrate_kbps: audio_kbps,
                    channels: 2,
                    sample_rate_hz: None,
                },
                video: Some(VideoParams {
                    codec: VideoCodec::H264,
                    height,
                    fps,
                    crf,
                    encoder_preset: "veryfast".to_string(),
                }),
            });
        }

        Self { profiles }
    }

    pub fn get(&self, kind: MediaKind, level: PresetLevel) -> Option<&PresetProfile> {
        self.profiles
            .iter()
            .find(|p| p.kind == kind && p.level == level)
    }

    /// Profiles available for a media kind, best first.
    pub fn levels_for(&self, kind: MediaKind) -> Vec<PresetLevel> {
        let mut levels: Vec<_> = self
            .profiles
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.level)
            .collect();
        levels.sort();
        levels
    }
}
