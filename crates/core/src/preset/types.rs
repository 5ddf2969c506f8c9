//! Types for the preset module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::job::MediaKind;

/// Named quality level, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetLevel {
    UltraHigh,
    High,
    Medium,
    Low,
    UltraLow,
}

impl PresetLevel {
    /// All levels from best to smallest output.
    pub const ALL: [PresetLevel; 5] = [
        Self::UltraHigh,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::UltraLow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UltraHigh => "ultra_high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::UltraLow => "ultra_low",
        }
    }

    /// Human-readable title, e.g. "Ultra High".
    pub fn title(&self) -> &'static str {
        match self {
            Self::UltraHigh => "Ultra High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::UltraLow => "Ultra Low",
        }
    }
}

impl fmt::Display for PresetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| format!("unknown preset level: {}", s))
    }
}

/// A preset as requested by a user. Serialized as `"auto"` or a level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RequestedPreset {
    /// Pick the level from the input size.
    Auto,
    Level(PresetLevel),
}

impl fmt::Display for RequestedPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Level(level) => level.fmt(f),
        }
    }
}

impl FromStr for RequestedPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Level)
        }
    }
}

impl TryFrom<String> for RequestedPreset {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RequestedPreset> for String {
    fn from(preset: RequestedPreset) -> Self {
        preset.to_string()
    }
}

/// Audio encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    Mp3,
    Aac,
}

impl AudioCodec {
    /// Returns the ffmpeg encoder name.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Aac => "aac",
        }
    }
}

/// Video encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    H264,
}

impl VideoCodec {
    /// Returns the ffmpeg encoder name.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::H264 => "libx264",
        }
    }
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Mp3,
    Mp4,
}

impl Container {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }

    /// Returns the ffmpeg muxer name (`-f`).
    pub fn ffmpeg_format(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }
}

/// Audio stream parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioParams {
    pub codec: AudioCodec,
    pub bitrate_kbps: u32,
    /// 1 = mono, 2 = stereo.
    pub channels: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<u32>,
}

/// Video stream parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoParams {
    pub codec: VideoCodec,
    /// Output height; width follows the aspect ratio.
    pub height: u32,
    pub fps: u32,
    /// Constant Rate Factor (lower = better).
    pub crf: u8,
    /// x264 speed preset.
    pub encoder_preset: String,
}

/// Concrete transcoding parameters for one (media kind, level) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetProfile {
    pub kind: MediaKind,
    pub level: PresetLevel,
    pub container: Container,
    pub audio: AudioParams,
    /// Present for video profiles only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoParams>,
}

impl PresetProfile {
    /// One-line description for user messages, e.g. "480p, 25fps" or "96kbps, Stereo".
    pub fn describe(&self) -> String {
        match &self.video {
            Some(video) => format!("{}p, {}fps", video.height, video.fps),
            None => format!(
                "{}kbps, {}",
                self.audio.bitrate_kbps,
                if self.audio.channels == 1 { "Mono" } else { "Stereo" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse_accepts_variants() {
        assert_eq!("ultra_high".parse::<PresetLevel>(), Ok(PresetLevel::UltraHigh));
        assert_eq!("Ultra-Low".parse::<PresetLevel>(), Ok(PresetLevel::UltraLow));
        assert_eq!("MEDIUM".parse::<PresetLevel>(), Ok(PresetLevel::Medium));
        assert!("extreme".parse::<PresetLevel>().is_err());
    }

    #[test]
    fn test_requested_preset_parse() {
        assert_eq!("auto".parse::<RequestedPreset>(), Ok(RequestedPreset::Auto));
        assert_eq!(
            "low".parse::<RequestedPreset>(),
            Ok(RequestedPreset::Level(PresetLevel::Low))
        );
        assert!("".parse::<RequestedPreset>().is_err());
    }

    #[test]
    fn test_requested_preset_serializes_as_name() {
        let json = serde_json::to_string(&RequestedPreset::Level(PresetLevel::UltraLow)).unwrap();
        assert_eq!(json, "\"ultra_low\"");
        let parsed: RequestedPreset = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(parsed, RequestedPreset::Auto);
        assert!(serde_json::from_str::<RequestedPreset>("\"best\"").is_err());
    }

    #[test]
    fn test_levels_ordered_best_first() {
        assert!(PresetLevel::UltraHigh < PresetLevel::High);
        assert!(PresetLevel::Low < PresetLevel::UltraLow);
    }

    #[test]
    fn test_container_extension() {
        assert_eq!(Container::Mp3.extension(), "mp3");
        assert_eq!(Container::Mp4.ffmpeg_format(), "mp4");
    }
}
