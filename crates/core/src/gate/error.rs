//! Admission rejection reasons.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::job::MediaKind;

/// Which sliding window a rate limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateScope {
    Hourly,
    Daily,
}

impl RateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a file was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AdmissionRejected {
    #[error("{kind} file of {size_bytes} bytes exceeds the {max_bytes} byte limit")]
    TooLarge {
        kind: MediaKind,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("file of {size_bytes} bytes is below the {min_bytes} byte minimum")]
    TooSmall { size_bytes: u64, min_bytes: u64 },

    #[error("{scope} limit reached: {count} of {limit} files")]
    RateLimited {
        scope: RateScope,
        count: u32,
        limit: u32,
    },
}

impl AdmissionRejected {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "too_large",
            Self::TooSmall { .. } => "too_small",
            Self::RateLimited {
                scope: RateScope::Hourly,
                ..
            } => "rate_limited_hourly",
            Self::RateLimited {
                scope: RateScope::Daily,
                ..
            } => "rate_limited_daily",
        }
    }
}
