//! Per-user in-memory state.
//!
//! [`UserStateStore`] is a sharded map keyed by [`UserId`] that remembers when
//! each entry was last touched so idle users can be swept out. Updates to one
//! user's entry are exclusive; different users never contend on the same lock.
//!
//! # Example
//!
//! ```ignore
//! use squish_core::store::UserStateStore;
//!
//! let store: UserStateStore<u32> = UserStateStore::new();
//! store.update(user, Utc::now(), u32::default, |count| *count += 1);
//! let evicted = store.evict_idle(Utc::now(), Duration::hours(24));
//! ```

mod preferences;

pub use preferences::{PreferenceStore, PreferencesConfig, UserPreferences};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::job::UserId;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    last_seen: DateTime<Utc>,
}

/// Sharded per-user state with idle eviction.
#[derive(Debug)]
pub struct UserStateStore<V> {
    entries: DashMap<UserId, Slot<V>>,
}

impl<V> Default for UserStateStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> UserStateStore<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Runs `f` on the user's entry, creating it with `init` if absent.
    ///
    /// The entry is locked for the duration of `f` and its last-seen time is
    /// set to `now`.
    pub fn update<R>(
        &self,
        user: UserId,
        now: DateTime<Utc>,
        init: impl FnOnce() -> V,
        f: impl FnOnce(&mut V) -> R,
    ) -> R {
        let mut slot = self.entries.entry(user).or_insert_with(|| Slot {
            value: init(),
            last_seen: now,
        });
        slot.last_seen = now;
        f(&mut slot.value)
    }

    /// Reads the user's entry without touching it.
    pub fn read<R>(&self, user: UserId, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.entries.get(&user).map(|slot| f(&slot.value))
    }

    pub fn remove(&self, user: UserId) -> Option<V> {
        self.entries.remove(&user).map(|(_, slot)| slot.value)
    }

    /// Drops entries not touched within `max_idle` of `now`. Returns how many were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, slot| now.signed_duration_since(slot.last_seen) < max_idle);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> UserStateStore<V> {
    pub fn get(&self, user: UserId) -> Option<V> {
        self.read(user, V::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_update_creates_and_mutates() {
        let store: UserStateStore<u32> = UserStateStore::new();
        let now = Utc::now();
        let user = UserId(1);

        let first = store.update(user, now, || 10, |v| {
            *v += 1;
            *v
        });
        let second = store.update(user, now, || 0, |v| {
            *v += 1;
            *v
        });

        assert_eq!(first, 11);
        assert_eq!(second, 12);
        assert_eq!(store.get(user), Some(12));
        assert_eq!(store.get(UserId(2)), None);
    }

    #[test]
    fn test_evict_idle_keeps_recent_users() {
        let store: UserStateStore<()> = UserStateStore::new();
        let now = Utc::now();
        store.update(UserId(1), now - Duration::hours(3), || (), |_| ());
        store.update(UserId(2), now - Duration::minutes(5), || (), |_| ());

        let evicted = store.evict_idle(now, Duration::hours(1));

        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(UserId(2)).is_some());
    }

    #[test]
    fn test_read_does_not_refresh() {
        let store: UserStateStore<u8> = UserStateStore::new();
        let now = Utc::now();
        store.update(UserId(7), now - Duration::hours(2), || 1, |_| ());
        assert_eq!(store.read(UserId(7), |v| *v), Some(1));
        assert_eq!(store.evict_idle(now, Duration::hours(1)), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_updates_same_user() {
        let store: Arc<UserStateStore<u64>> = Arc::new(UserStateStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.update(UserId(1), Utc::now(), || 0, |v| *v += 1);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get(UserId(1)), Some(800));
    }
}
