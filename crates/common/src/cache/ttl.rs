//! Concurrent map whose entries carry their own expiry.
//!
//! Reads expire lazily: an entry past its deadline is treated exactly like a
//! missing key and is removed on the spot. A [`CacheSweeper`] can purge
//! entries nobody reads any more.
//!
//! [`CacheSweeper`]: super::CacheSweeper

use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::stats::{CacheEvent, CacheStats, Counters};
use crate::time::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Something holding expiring entries that a sweeper can purge
pub trait Expiring: Send + Sync + 'static {
    /// Remove every expired entry, returning how many were dropped
    fn purge_expired(&self) -> usize;
}

/// TTL cache keyed by `K`, generic over its [`Clock`].
///
/// Writes are last-writer-wins; lookups and purges never block each other
/// beyond the per-shard locking of the underlying map.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use carrierlink_common::cache::TtlCache;
///
/// let cache: TtlCache<String, String> = TtlCache::new();
/// cache.set("carrier-token".to_string(), "abc".to_string(), Duration::from_secs(60));
/// assert_eq!(cache.get(&"carrier-token".to_string()).as_deref(), Some("abc"));
/// ```
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Eq + Hash,
    C: Clock,
{
    entries: DashMap<K, Entry<V>>,
    clock: C,
    counters: Counters,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create an empty cache reading time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self { entries: DashMap::new(), clock, counters: Counters::default() }
    }

    /// Return the live value for `key`.
    ///
    /// An expired entry counts as a miss and is removed. The removal only
    /// applies if the entry is still expired, so a concurrent `set` is never
    /// undone.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => {
                self.counters.record(CacheEvent::Hit);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired && self.entries.remove_if(key, |_, entry| !entry.is_live(now)).is_some() {
            self.counters.record(CacheEvent::Expired(1));
        }

        self.counters.record(CacheEvent::Miss);
        None
    }

    /// Store `value` under `key` until `now + ttl`, replacing any previous
    /// entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries.insert(key, Entry { value, expires_at });
        self.counters.record(CacheEvent::Write);
    }

    /// Drop `key` regardless of expiry. Idempotent.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Time left before `key` expires, if it is live
    pub fn remaining_ttl(&self, key: &K) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at.duration_since(now))
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.read(self.entries.len())
    }

    fn purge(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });
        self.counters.record(CacheEvent::Expired(removed as u64));
        removed
    }
}

impl<K, V, C> Expiring for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    fn purge_expired(&self) -> usize {
        self.purge()
    }
}

impl<K, V, C> fmt::Debug for TtlCache<K, V, C>
where
    K: Eq + Hash,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").field("entries", &self.entries.len()).finish_non_exhaustive()
    }
}
