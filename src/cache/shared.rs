//! Shared Result Cache
//!
//! Thread-safe handle around [`CacheStore`] used by concurrent request
//! handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CachePolicy, CacheStats, CacheStore};
use crate::models::{BadgeImage, BadgeRequest};

// == Result Cache ==
/// Cloneable handle to one process-wide badge cache.
///
/// Lookups share a read lock; writes, clears and policy changes take the
/// write lock. Network I/O must never happen while a guard is held, so all
/// methods acquire and release the lock internally.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl ResultCache {
    /// Creates an empty cache governed by `policy`.
    pub fn new(policy: CachePolicy) -> Self {
        Self::from_store(CacheStore::new(policy))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn set_policy(&self, policy: CachePolicy) {
        self.inner.write().await.set_policy(policy);
    }

    pub async fn policy(&self) -> CachePolicy {
        self.inner.read().await.policy()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// True if a valid entry exists for `request`.
    pub async fn is_cached(&self, request: &BadgeRequest) -> bool {
        self.inner.read().await.is_cached(request)
    }

    /// Stored image for `request`, or None on a miss.
    pub async fn get(&self, request: &BadgeRequest) -> Option<BadgeImage> {
        self.inner.read().await.get(request)
    }

    /// Stores `image` for `request` unless caching is disabled.
    pub async fn put(&self, request: BadgeRequest, image: BadgeImage) {
        self.inner.write().await.put(request, image);
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}
