//! Per-user default presets.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{MediaKind, UserId};
use crate::preset::{PresetLevel, RequestedPreset};

use super::UserStateStore;

fn default_preset() -> RequestedPreset {
    RequestedPreset::Level(PresetLevel::Medium)
}

fn default_idle_ttl_secs() -> u64 {
    7 * 24 * 3600
}

/// Configuration for stored preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preset used when a user has not chosen one.
    #[serde(default = "default_preset")]
    pub default_preset: RequestedPreset,
    /// Preferences untouched for this long are forgotten.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

/// A user's chosen preset for each media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub audio: RequestedPreset,
    pub video: RequestedPreset,
}

impl UserPreferences {
    fn uniform(preset: RequestedPreset) -> Self {
        Self {
            audio: preset,
            video: preset,
        }
    }

    pub fn for_kind(&self, kind: MediaKind) -> RequestedPreset {
        match kind {
            MediaKind::Audio => self.audio,
            MediaKind::Video => self.video,
        }
    }
}

/// Remembers which preset each user wants when a file arrives without one.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    config: PreferencesConfig,
    users: UserStateStore<UserPreferences>,
}

impl PreferenceStore {
    pub fn new(config: PreferencesConfig) -> Self {
        Self {
            config,
            users: UserStateStore::new(),
        }
    }

    /// Returns the user's preset for `kind`, or the configured default.
    pub fn get(&self, user: UserId, kind: MediaKind) -> RequestedPreset {
        self.users
            .read(user, |prefs| prefs.for_kind(kind))
            .unwrap_or(self.config.default_preset)
    }

    pub fn all(&self, user: UserId) -> UserPreferences {
        self.users
            .get(user)
            .unwrap_or_else(|| UserPreferences::uniform(self.config.default_preset))
    }

    pub fn set(&self, user: UserId, kind: MediaKind, preset: RequestedPreset) {
        self.set_at(user, kind, preset, Utc::now());
    }

    pub fn set_at(&self, user: UserId, kind: MediaKind, preset: RequestedPreset, now: DateTime<Utc>) {
        let default = self.config.default_preset;
        self.users.update(
            user,
            now,
            || UserPreferences::uniform(default),
            |prefs| match kind {
                MediaKind::Audio => prefs.audio = preset,
                MediaKind::Video => prefs.video = preset,
            },
        );
    }

    /// Forgets users idle longer than the configured TTL.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let ttl = Duration::seconds(self.config.idle_ttl_secs as i64);
        self.users.evict_idle(now, ttl)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
