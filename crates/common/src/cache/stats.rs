//! Hit/miss accounting for [`TtlCache`](super::TtlCache)

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a cache's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Stored entries, including expired ones not yet purged
    pub entries: usize,
    pub hits: u64,
    /// Lookups that found nothing live; an expired entry counts here
    pub misses: u64,
    pub writes: u64,
    /// Entries dropped because their TTL elapsed, on read or by a sweep
    pub expired: u64,
}

impl CacheStats {
    /// Share of lookups served from the cache, `None` before the first lookup
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheEvent {
    Hit,
    Miss,
    Write,
    Expired(u64),
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    expired: AtomicU64,
}

impl Counters {
    pub(crate) fn record(&self, event: CacheEvent) {
        let (counter, amount) = match event {
            CacheEvent::Hit => (&self.hits, 1),
            CacheEvent::Miss => (&self.misses, 1),
            CacheEvent::Write => (&self.writes, 1),
            CacheEvent::Expired(0) => return,
            CacheEvent::Expired(n) => (&self.expired, n),
        };
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub(crate) fn read(&self, entries: usize) -> CacheStats {
        CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_is_none_without_lookups() {
        assert_eq!(CacheStats::default().hit_ratio(), None);
    }

    #[test]
    fn hit_ratio_counts_expired_reads_as_misses() {
        let stats = CacheStats { hits: 3, misses: 1, ..CacheStats::default() };
        assert_eq!(stats.hit_ratio(), Some(0.75));
    }

    #[test]
    fn counters_accumulate_events() {
        let counters = Counters::default();
        for event in [
            CacheEvent::Write,
            CacheEvent::Hit,
            CacheEvent::Miss,
            CacheEvent::Expired(0),
            CacheEvent::Expired(2),
        ] {
            counters.record(event);
        }

        assert_eq!(
            counters.read(1),
            CacheStats { entries: 1, hits: 1, misses: 1, writes: 1, expired: 2 }
        );
    }
}
