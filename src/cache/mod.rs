//! Cache Module
//!
//! Provides the in-memory badge result cache with lazy validity checks and
//! size-bounded, oldest-first eviction.

mod entry;
mod policy;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use policy::{CachePolicy, DEFAULT_MAX_ENTRIES, DEFAULT_VALIDITY};
pub use shared::ResultCache;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;
