//! Error types for the preset module.

use thiserror::Error;

use crate::job::MediaKind;

/// Errors that can occur while resolving a preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    /// The name is neither `auto` nor a known level for the media kind.
    #[error("Unknown {kind} preset: {name}")]
    UnknownPreset { kind: MediaKind, name: String },
}

impl PresetError {
    pub fn unknown(kind: MediaKind, name: impl Into<String>) -> Self {
        Self::UnknownPreset {
            kind,
            name: name.into(),
        }
    }
}
