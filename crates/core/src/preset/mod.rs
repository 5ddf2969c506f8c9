//! Preset module: named quality levels and their transcoding parameters.
//!
//! A preset is a named quality level (`ultra_high` … `ultra_low`) that maps,
//! per media kind, to a fixed [`PresetProfile`]. The [`PresetResolver`]
//! turns a requested preset (a level name or `auto`) into a profile; `auto`
//! picks the level from the input size using configurable thresholds.
//!
//! # Example
//!
//! ```ignore
//! use squish_core::preset::{PresetConfig, PresetResolver};
//! use squish_core::MediaKind;
//!
//! let resolver = PresetResolver::new(PresetConfig::default());
//! let profile = resolver.resolve(MediaKind::Audio, "auto", 10 * 1024 * 1024)?;
//! assert_eq!(profile.level.as_str(), "high");
//! ```

mod config;
mod error;
mod resolver;
mod table;
mod types;

pub use config::{AutoThresholds, PresetConfig};
pub use error::PresetError;
pub use resolver::PresetResolver;
pub use table::PresetTable;
pub use types::{
    AudioCodec, AudioParams, Container, PresetLevel, PresetProfile, RequestedPreset, VideoCodec,
    VideoParams,
};
