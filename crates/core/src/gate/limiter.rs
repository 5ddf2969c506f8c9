//! Size and rate admission gate.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::job::{MediaKind, UserId};
use crate::metrics;
use crate::store::UserStateStore;

use super::config::LimitsConfig;
use super::error::{AdmissionRejected, RateScope};
use super::window::ActivityWindow;

/// Counts after a successful admission, including the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub hourly_count: u32,
    pub daily_count: u32,
}

/// Validates files against size bounds and per-user sliding windows.
///
/// Each user's window is only touched while that user's entry is locked, so
/// concurrent admissions for the same user are serialized and admissions for
/// different users proceed independently.
#[derive(Debug)]
pub struct SizeAndRateGate {
    config: LimitsConfig,
    windows: UserStateStore<ActivityWindow>,
}

impl SizeAndRateGate {
    pub fn new(config: LimitsConfig) -> Self {
        Self {
            config,
            windows: UserStateStore::new(),
        }
    }

    pub fn config(&self) -> &LimitsConfig {
        &self.config
    }

    /// Admits a file submitted now.
    pub fn admit(
        &self,
        user: UserId,
        kind: MediaKind,
        size_bytes: u64,
    ) -> Result<Admission, AdmissionRejected> {
        self.admit_at(user, kind, size_bytes, Utc::now())
    }

    /// Admits a file submitted at `now`.
    pub fn admit_at(
        &self,
        user: UserId,
        kind: MediaKind,
        size_bytes: u64,
        now: DateTime<Utc>,
    ) -> Result<Admission, AdmissionRejected> {
        let result = self.check(user, kind, size_bytes, now);

        match &result {
            Ok(admission) => {
                metrics::ADMISSIONS.with_label_values(&["accepted"]).inc();
                debug!(
                    user_id = %user,
                    media_kind = %kind,
                    size_bytes,
                    hourly = admission.hourly_count,
                    daily = admission.daily_count,
                    "File admitted"
                );
            }
            Err(rejection) => {
                metrics::ADMISSIONS
                    .with_label_values(&[rejection.label()])
                    .inc();
                warn!(
                    user_id = %user,
                    media_kind = %kind,
                    size_bytes,
                    reason = rejection.label(),
                    "File rejected: {}",
                    rejection
                );
            }
        }

        result
    }

    fn check(
        &self,
        user: UserId,
        kind: MediaKind,
        size_bytes: u64,
        now: DateTime<Utc>,
    ) -> Result<Admission, AdmissionRejected> {
        let max_bytes = self.config.max_size_for(kind);
        if size_bytes > max_bytes {
            return Err(AdmissionRejected::TooLarge {
                kind,
                size_bytes,
                max_bytes,
            });
        }

        if size_bytes < self.config.min_file_size_bytes {
            return Err(AdmissionRejected::TooSmall {
                size_bytes,
                min_bytes: self.config.min_file_size_bytes,
            });
        }

        let hourly_cap = self.config.max_files_per_hour;
        let daily_cap = self.config.max_files_per_day;

        self.windows.update(user, now, ActivityWindow::new, |window| {
            window.prune(now);
            let daily = window.daily_count(now);
            let hourly = window.hourly_count(now);

            if daily >= daily_cap {
                return Err(AdmissionRejected::RateLimited {
                    scope: RateScope::Daily,
                    count: daily,
                    limit: daily_cap,
                });
            }
            if hourly >= hourly_cap {
                return Err(AdmissionRejected::RateLimited {
                    scope: RateScope::Hourly,
                    count: hourly,
                    limit: hourly_cap,
                });
            }

            window.record(now);
            Ok(Admission {
                hourly_count: hourly + 1,
                daily_count: daily + 1,
            })
        })
    }

    /// Current (hourly, daily) counts for a user without recording anything.
    pub fn usage(&self, user: UserId, now: DateTime<Utc>) -> (u32, u32) {
        self.windows
            .read(user, |w| (w.hourly_count(now), w.daily_count(now)))
            .unwrap_or((0, 0))
    }

    /// Drops windows of users with no activity in the last day.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        self.windows.evict_idle(now, Duration::hours(24))
    }

    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }
}
