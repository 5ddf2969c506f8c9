//! Sliding window of admission timestamps for one user.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Ordered admission timestamps, oldest first, covering at most the trailing day.
#[derive(Debug, Clone, Default)]
pub struct ActivityWindow {
    admissions: VecDeque<DateTime<Utc>>,
}

impl ActivityWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops timestamps older than 24 hours before `now`.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(24);
        while self.admissions.front().is_some_and(|t| *t <= cutoff) {
            self.admissions.pop_front();
        }
    }

    /// Admissions within the trailing hour.
    pub fn hourly_count(&self, now: DateTime<Utc>) -> u32 {
        self.count_since(now - Duration::hours(1))
    }

    /// Admissions within the trailing 24 hours.
    pub fn daily_count(&self, now: DateTime<Utc>) -> u32 {
        self.count_since(now - Duration::hours(24))
    }

    /// Appends an admission and prunes expired ones.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.admissions.push_back(now);
        self.prune(now);
    }

    pub fn len(&self) -> usize {
        self.admissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admissions.is_empty()
    }

    fn count_since(&self, cutoff: DateTime<Utc>) -> u32 {
        // Timestamps are appended in order, so count from the back.
        self.admissions
            .iter()
            .rev()
            .take_while(|t| **t > cutoff)
            .count() as u32
    }
}
