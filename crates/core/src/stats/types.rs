//! Counter document types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::job::UserId;

/// Counters for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub files: u64,
    pub bytes_saved: u64,
    pub audio_files: u64,
    pub video_files: u64,
}

/// Counters for one calendar day (UTC).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub files: u64,
    pub distinct_users: u64,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_files_processed: u64,
    pub total_bytes_saved: u64,
    pub users: BTreeMap<UserId, UserStats>,
    pub days: BTreeMap<NaiveDate, DayStats>,
}
