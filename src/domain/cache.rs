//! Time-to-live cache for computed snapshots.
//!
//! Entries are keyed by ticker, retained window length and as-of date, so a
//! changed lookback or a new trading day never returns a stale snapshot.
//! The caller supplies `now`; the cache never reads the clock itself.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub window_days: u32,
    pub as_of: NaiveDate,
}

impl CacheKey {
    pub fn new(ticker: impl Into<String>, window_days: u32, as_of: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            window_days,
            as_of,
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry<V>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if it was inserted less than `ttl` before `now`.
    pub fn get(&self, key: &CacheKey, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|e| now.saturating_duration_since(e.inserted_at) < self.ttl)
            .map(|e| &e.value)
    }

    pub fn insert(&mut self, key: CacheKey, value: V, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
