//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with refresh tracking.

use std::time::{Duration, Instant};

use crate::models::{BadgeImage, BadgeRequest};

// == Cache Entry ==
/// A rendered badge together with the request that produced it and the
/// moment it was last stored.
///
/// Entries are never mutated in place; re-storing a request replaces its
/// entry wholesale.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The request this entry answers
    pub request: BadgeRequest,
    /// The stored image
    pub image: BadgeImage,
    /// When the entry was last written
    pub refreshed_at: Instant,
    /// Insertion sequence number, breaks ties between equal timestamps
    pub(crate) sequence: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry refreshed at `now`.
    pub fn new(request: BadgeRequest, image: BadgeImage, now: Instant, sequence: u64) -> Self {
        Self {
            request,
            image,
            refreshed_at: now,
            sequence,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was written, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.refreshed_at)
    }

    // == Is Valid ==
    /// Checks if the entry may still be served.
    ///
    /// Boundary condition: an entry whose age equals `validity` is stale.
    pub fn is_valid(&self, validity: Duration, now: Instant) -> bool {
        self.age(now) < validity
    }

    /// Ordering key for eviction: oldest refresh first, then oldest insertion.
    pub(crate) fn eviction_rank(&self) -> (Instant, u64) {
        (self.refreshed_at, self.sequence)
    }
}
