//! In-memory stats recorder.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::job::{CompressionSummary, MediaKind, UserId};

use super::types::{DayStats, StatsSnapshot, UserStats};
use super::StatsRecorder;

#[derive(Debug, Default)]
struct DayAccumulator {
    files: u64,
    users: HashSet<UserId>,
}

#[derive(Debug, Default)]
struct Counters {
    total_files_processed: u64,
    total_bytes_saved: u64,
    users: HashMap<UserId, UserStats>,
    days: BTreeMap<NaiveDate, DayAccumulator>,
}

/// Counters document kept in memory. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStats {
    counters: RwLock<Counters>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one processed file at `now`.
    pub async fn increment_at(
        &self,
        user_id: UserId,
        kind: MediaKind,
        original_size: u64,
        compressed_size: u64,
        now: DateTime<Utc>,
    ) {
        let saved = CompressionSummary::new(original_size, compressed_size).space_saved;
        let mut counters = self.counters.write().await;

        counters.total_files_processed += 1;
        counters.total_bytes_saved += saved;

        let user = counters.users.entry(user_id).or_default();
        user.files += 1;
        user.bytes_saved += saved;
        match kind {
            MediaKind::Audio => user.audio_files += 1,
            MediaKind::Video => user.video_files += 1,
        }

        let day = counters.days.entry(now.date_naive()).or_default();
        day.files += 1;
        day.users.insert(user_id);

        debug!(user_id = %user_id, bytes_saved = saved, "Stats updated");
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.read().await;
        StatsSnapshot {
            total_files_processed: counters.total_files_processed,
            total_bytes_saved: counters.total_bytes_saved,
            users: counters
                .users
                .iter()
                .map(|(id, stats)| (*id, stats.clone()))
                .collect(),
            days: counters
                .days
                .iter()
                .map(|(date, day)| {
                    (
                        *date,
                        DayStats {
                            files: day.files,
                            distinct_users: day.users.len() as u64,
                        },
                    )
                })
                .collect(),
        }
    }

    pub async fn user(&self, user_id: UserId) -> Option<UserStats> {
        self.counters.read().await.users.get(&user_id).cloned()
    }
}

#[async_trait]
impl StatsRecorder for InMemoryStats {
    async fn increment(
        &self,
        user_id: UserId,
        kind: MediaKind,
        original_size: u64,
        compressed_size: u64,
    ) {
        self.increment_at(user_id, kind, original_size, compressed_size, Utc::now())
            .await;
    }
}
