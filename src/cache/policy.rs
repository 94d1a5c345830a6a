//! Cache Policy Module
//!
//! Validity window and size bound applied to every cache operation.

use std::time::Duration;

/// Default validity window for cached badges.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(10 * 60);

/// Default maximum number of cached badges.
pub const DEFAULT_MAX_ENTRIES: i64 = 100;

// == Cache Policy ==
/// Governs how long entries stay valid and how many may be stored.
///
/// A zero `validity` disables caching entirely: nothing is written and every
/// lookup misses. A non-positive `max_entries` means "keep nothing": the
/// whole store is cleared after each insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Time after its last refresh during which an entry is served
    pub validity: Duration,
    /// Maximum number of entries kept after an insertion
    pub max_entries: i64,
}

impl CachePolicy {
    // == Constructor ==
    pub fn new(validity: Duration, max_entries: i64) -> Self {
        Self {
            validity,
            max_entries,
        }
    }

    /// Policy that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, DEFAULT_MAX_ENTRIES)
    }

    /// Returns true when caching is turned off (zero validity).
    pub fn is_disabled(&self) -> bool {
        self.validity.is_zero()
    }

    /// Entry bound as a count, or None when the bound is non-positive.
    pub fn capacity(&self) -> Option<usize> {
        if self.max_entries <= 0 {
            None
        } else {
            Some(usize::try_from(self.max_entries).unwrap_or(usize::MAX))
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY, DEFAULT_MAX_ENTRIES)
    }
}
