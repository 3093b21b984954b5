// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based key/value caching with an injectable time source
//!
//! Entries only leave a partition when a read finds them expired (lazy
//! eviction), when the optional capacity bound forces an eviction, or when
//! the owner calls [`TtlCache::purge_expired`] / [`TtlCache::clear`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// Source of "now" for cache expiry and resolution timestamps
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for deterministic tests
///
/// Unlike a simulation clock this one may be moved backwards, which lets
/// tests check that an evicted entry stays evicted.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to an arbitrary instant (may be in the past)
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move forward by `step`
    pub fn advance(&self, step: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = add_duration(*current, step);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Saturating `instant + step`
pub(crate) fn add_duration(instant: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(step)
        .ok()
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet evicted)
    pub expired: usize,
    /// Maximum cache capacity, `None` when unbounded
    pub max: Option<usize>,
}

/// Expiring key/value store
///
/// One instance is one cache partition. Values are cloned out on read and
/// replaced whole on write; an entry is never mutated in place.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    max_entries: Option<usize>,
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an unbounded partition
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity_bound(clock, None)
    }

    /// Create a partition, optionally bounded to `max_entries`
    ///
    /// When bounded, inserting a new key into a full partition evicts the
    /// entry closest to expiry first.
    pub fn with_capacity_bound(clock: Arc<dyn Clock>, max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            max_entries: max_entries.filter(|max| *max > 0),
        }
    }

    /// Get a live value
    ///
    /// A stale entry is removed as a side effect and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Re-check under the write lock: another writer may have replaced it
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` for `ttl`, replacing any prior entry for `key`
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = add_duration(self.clock.now(), ttl);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(&key) {
                Self::evict_soonest(&mut entries);
            }
        }

        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the partition holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            total: entries.len(),
            expired: entries.values().filter(|e| now >= e.expires_at).count(),
            max: self.max_entries,
        }
    }

    fn evict_soonest(entries: &mut HashMap<K, CacheEntry<V>>) {
        if let Some(soonest) = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone())
        {
            entries.remove(&soonest);
        }
    }
}
