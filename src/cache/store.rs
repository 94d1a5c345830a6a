//! Cache Store Module
//!
//! Single-threaded cache engine: a map of badge requests to rendered images
//! with lazy validity checks and oldest-first eviction.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::cache::{CacheEntry, CachePolicy, CacheStats, StatsCounters};
use crate::models::{BadgeImage, BadgeRequest};

// == Cache Store ==
/// Badge result storage governed by a [`CachePolicy`].
///
/// Expired entries are never swept; they are reported as misses on read and
/// only leave the map through eviction or [`CacheStore::clear`].
#[derive(Debug)]
pub struct CacheStore {
    /// Request to entry storage
    entries: HashMap<BadgeRequest, CacheEntry>,
    /// Active policy
    policy: CachePolicy,
    /// Performance statistics
    stats: StatsCounters,
    /// Next insertion sequence number
    next_sequence: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore with the given policy.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            stats: StatsCounters::new(),
            next_sequence: 0,
        }
    }

    // == Policy ==
    /// Returns the active policy.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Replaces the active policy.
    ///
    /// Existing entries are left untouched; the new bound applies from the
    /// next insertion and the new validity from the next read.
    pub fn set_policy(&mut self, policy: CachePolicy) {
        self.policy = policy;
    }

    // == Is Cached ==
    /// Returns true if a valid entry exists for `request`.
    pub fn is_cached(&self, request: &BadgeRequest) -> bool {
        self.is_cached_at(request, Instant::now())
    }

    pub(crate) fn is_cached_at(&self, request: &BadgeRequest, now: Instant) -> bool {
        self.valid_entry(request, now).is_some()
    }

    // == Get ==
    /// Returns a copy of the stored image if present and valid.
    pub fn get(&self, request: &BadgeRequest) -> Option<BadgeImage> {
        self.get_at(request, Instant::now())
    }

    pub(crate) fn get_at(&self, request: &BadgeRequest, now: Instant) -> Option<BadgeImage> {
        match self.valid_entry(request, now) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.image.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores `image` for `request`, refreshing it to now.
    ///
    /// Does nothing while caching is disabled. Otherwise replaces any
    /// previous entry for the request, then evicts to honor the size bound.
    pub fn put(&mut self, request: BadgeRequest, image: BadgeImage) {
        self.put_at(request, image, Instant::now());
    }

    pub(crate) fn put_at(&mut self, request: BadgeRequest, image: BadgeImage, now: Instant) {
        if self.policy.is_disabled() {
            debug!("Caching disabled, discarding result for {}", request);
            return;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = CacheEntry::new(request.clone(), image, now, sequence);
        self.entries.insert(request, entry);

        self.evict();
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the number of stored entries, valid or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn valid_entry(&self, request: &BadgeRequest, now: Instant) -> Option<&CacheEntry> {
        self.entries
            .get(request)
            .filter(|entry| entry.is_valid(self.policy.validity, now))
    }

    // == Evict ==
    /// Removes oldest entries until the size bound holds.
    ///
    /// A non-positive bound clears the whole store. Returns the number of
    /// entries removed.
    fn evict(&mut self) -> usize {
        let Some(capacity) = self.policy.capacity() else {
            let removed = self.entries.len();
            self.entries.clear();
            self.stats.record_evictions(removed as u64);
            if removed > 0 {
                debug!("Non-positive cache bound, dropped {} entries", removed);
            }
            return removed;
        };

        let mut removed = 0;
        while self.entries.len() > capacity {
            let Some(oldest) = self.oldest_key() else {
                break;
            };
            debug!("Evicting oldest cached badge {}", oldest);
            self.entries.remove(&oldest);
            removed += 1;
        }

        self.stats.record_evictions(removed as u64);
        removed
    }

    /// Key of the entry with the earliest refresh.
    fn oldest_key(&self) -> Option<BadgeRequest> {
        self.entries
            .values()
            .min_by_key(|entry| entry.eviction_rank())
            .map(|entry| entry.request.clone())
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}
