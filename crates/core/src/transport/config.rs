//! Configuration for the filesystem transport.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directories used by [`LocalTransport`](super::LocalTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTransportConfig {
    /// Inputs are read from here. Locations are relative to it.
    #[serde(default = "default_inbox_dir")]
    pub inbox_dir: PathBuf,

    /// Outputs and messages land in `<outbox_dir>/<user_id>/`.
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: PathBuf,
}

fn default_inbox_dir() -> PathBuf {
    PathBuf::from("./data/inbox")
}

fn default_outbox_dir() -> PathBuf {
    PathBuf::from("./data/outbox")
}

impl Default for LocalTransportConfig {
    fn default() -> Self {
        Self {
            inbox_dir: default_inbox_dir(),
            outbox_dir: default_outbox_dir(),
        }
    }
}

impl LocalTransportConfig {
    pub fn new(inbox_dir: impl Into<PathBuf>, outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            inbox_dir: inbox_dir.into(),
            outbox_dir: outbox_dir.into(),
        }
    }
}
