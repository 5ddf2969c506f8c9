use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::gate::LimitsConfig;
use crate::preset::PresetConfig;
use crate::runner::WorkspaceConfig;
use crate::scheduler::SchedulerConfig;
use crate::store::PreferencesConfig;
use crate::transcoder::TranscoderConfig;
use crate::transport::LocalTransportConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub presets: PresetConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub transport: LocalTransportConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{PresetLevel, RequestedPreset};

    #[test]
    fn test_empty_document_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_files_per_hour, 10);
        assert_eq!(config.scheduler.max_concurrent, 3);
        assert_eq!(
            config.preferences.default_preset,
            RequestedPreset::Level(PresetLevel::Medium)
        );
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[limits]
max_files_per_day = 100

[preferences]
default_preset = "auto"
"#,
        )
        .unwrap();
        assert_eq!(config.limits.max_files_per_day, 100);
        assert_eq!(config.limits.max_files_per_hour, 10);
        assert_eq!(config.preferences.default_preset, RequestedPreset::Auto);
    }
}
