//! Aggregate and per-user processing counters.
//!
//! The pipeline only ever calls [`StatsRecorder::increment`]; how counters are
//! stored is up to the implementation. [`InMemoryStats`] keeps the counters
//! document in memory and can produce snapshots of it.

mod memory;
mod types;

pub use memory::InMemoryStats;
pub use types::{DayStats, StatsSnapshot, UserStats};

use async_trait::async_trait;

use crate::job::{MediaKind, UserId};

/// Narrow increment interface for finished jobs.
#[async_trait]
pub trait StatsRecorder: Send + Sync {
    /// Records one processed file. Saved space is clamped at zero.
    async fn increment(
        &self,
        user_id: UserId,
        kind: MediaKind,
        original_size: u64,
        compressed_size: u64,
    );
}
