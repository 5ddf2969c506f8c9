//! Maps a requested preset name to concrete transcoding parameters.

use crate::job::MediaKind;

use super::config::PresetConfig;
use super::error::PresetError;
use super::table::PresetTable;
use super::types::{PresetProfile, RequestedPreset};

/// Pure, deterministic preset resolution.
#[derive(Debug, Clone, Default)]
pub struct PresetResolver {
    config: PresetConfig,
    table: PresetTable,
}

impl PresetResolver {
    /// Creates a resolver over the built-in table.
    pub fn new(config: PresetConfig) -> Self {
        Self {
            config,
            table: PresetTable::builtin(),
        }
    }

    /// Creates a resolver over a custom table.
    pub fn with_table(config: PresetConfig, table: PresetTable) -> Self {
        Self { config, table }
    }

    pub fn config(&self) -> &PresetConfig {
        &self.config
    }

    /// Resolves `requested` (a level name or `auto`) for the given media kind.
    ///
    /// `input_size` is only consulted for `auto`.
    pub fn resolve(
        &self,
        kind: MediaKind,
        requested: &str,
        input_size: u64,
    ) -> Result<PresetProfile, PresetError> {
        let requested: RequestedPreset = requested
            .parse()
            .map_err(|_| PresetError::unknown(kind, requested))?;

        let level = match requested {
            RequestedPreset::Auto => self.config.thresholds(kind).select(input_size),
            RequestedPreset::Level(level) => level,
        };

        self.table
            .get(kind, level)
            .cloned()
            .ok_or_else(|| PresetError::unknown(kind, level.as_str()))
    }
}
