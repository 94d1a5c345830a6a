//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against its validity and eviction rules.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::cache::{CachePolicy, CacheStore, ResultCache};
use crate::models::{BadgeImage, BadgeRequest, BadgeType};

// == Test Configuration ==
const TEST_VALIDITY: Duration = Duration::from_secs(600);
const TEST_MAX_ENTRIES: i64 = 100;

// == Strategies ==
fn badge_type_strategy() -> impl Strategy<Value = BadgeType> {
    prop::sample::select(BadgeType::ALL.to_vec())
}

/// Generates badge requests over a small name space so keys collide often
fn request_strategy() -> impl Strategy<Value = BadgeRequest> {
    ("[a-c]{1,2}", "[a-c]{1,2}", badge_type_strategy())
        .prop_map(|(owner, repo, badge_type)| BadgeRequest::new(owner, repo, badge_type))
}

fn image_strategy() -> impl Strategy<Value = BadgeImage> {
    (prop::collection::vec(any::<u8>(), 0..64), "[a-z+]{1,8}")
        .prop_map(|(data, ext)| BadgeImage::new(data, ext))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put(BadgeRequest),
    Get(BadgeRequest),
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => request_strategy().prop_map(CacheOp::Put),
        3 => request_strategy().prop_map(CacheOp::Get),
        1 => Just(CacheOp::Clear),
    ]
}

fn store_with(max_entries: i64) -> CacheStore {
    CacheStore::new(CachePolicy::new(TEST_VALIDITY, max_entries))
}

fn unique(requests: Vec<BadgeRequest>) -> Vec<BadgeRequest> {
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A stored image is returned unchanged while valid.
    #[test]
    fn prop_roundtrip_storage(request in request_strategy(), image in image_strategy()) {
        let mut store = store_with(TEST_MAX_ENTRIES);

        store.put(request.clone(), image.clone());

        prop_assert!(store.is_cached(&request));
        prop_assert_eq!(store.get(&request), Some(image));
    }

    // Zero validity never stores anything, whatever the bound.
    #[test]
    fn prop_zero_validity_never_caches(
        requests in prop::collection::vec(request_strategy(), 1..30),
        max_entries in -5i64..1000
    ) {
        let mut store = CacheStore::new(CachePolicy::new(Duration::ZERO, max_entries));

        for request in &requests {
            store.put(request.clone(), BadgeImage::svg("x"));
            prop_assert!(!store.is_cached(request));
            prop_assert!(store.get(request).is_none());
        }
        prop_assert!(store.is_empty());
    }

    // The entry count never exceeds a positive bound.
    #[test]
    fn prop_capacity_enforcement(
        requests in prop::collection::vec(request_strategy(), 1..200),
        max_entries in 1i64..20
    ) {
        let mut store = store_with(max_entries);

        for request in requests {
            store.put(request, BadgeImage::svg("x"));
            prop_assert!(
                store.len() as i64 <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // A non-positive bound leaves nothing behind after any insertion.
    #[test]
    fn prop_non_positive_bound_keeps_nothing(
        requests in prop::collection::vec(request_strategy(), 1..30),
        max_entries in -10i64..=0
    ) {
        let mut store = store_with(max_entries);

        for request in requests {
            store.put(request.clone(), BadgeImage::svg("x"));
            prop_assert!(store.is_empty());
            prop_assert!(!store.is_cached(&request));
        }
    }

    // Inserting N+1 distinct keys keeps exactly the N most recent.
    #[test]
    fn prop_oldest_is_evicted(
        requests in prop::collection::vec(request_strategy(), 2..20)
    ) {
        let keys = unique(requests);
        prop_assume!(keys.len() >= 2);

        let capacity = keys.len() - 1;
        let mut store = store_with(capacity as i64);
        let start = Instant::now();

        for (i, key) in keys.iter().enumerate() {
            store.put_at(key.clone(), BadgeImage::svg("x"), start + Duration::from_millis(i as u64));
        }

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.is_cached(&keys[0]), "Oldest key should have been evicted");
        for key in keys.iter().skip(1) {
            prop_assert!(store.is_cached(key), "Key {} should still be cached", key);
        }
    }

    // Requests that differ only in badge type are distinct keys.
    #[test]
    fn prop_badge_type_distinguishes_keys(
        owner in "[a-z]{1,8}",
        repo in "[a-z]{1,8}",
        cached_type in badge_type_strategy(),
        other_type in badge_type_strategy()
    ) {
        prop_assume!(cached_type != other_type);
        let mut store = store_with(TEST_MAX_ENTRIES);

        store.put(BadgeRequest::new(&owner, &repo, cached_type), BadgeImage::svg("x"));

        let other = BadgeRequest::new(&owner, &repo, other_type);
        prop_assert!(!store.is_cached(&other));
        prop_assert!(store.get(&other).is_none());
    }

    // The store matches a reference model ordered by last refresh.
    #[test]
    fn prop_matches_refresh_order_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
        max_entries in 1i64..6
    ) {
        let capacity = max_entries as usize;
        let mut store = store_with(max_entries);
        // Front = oldest refresh
        let mut model: Vec<BadgeRequest> = Vec::new();
        let mut touched: HashSet<BadgeRequest> = HashSet::new();
        let start = Instant::now();

        for (tick, op) in ops.into_iter().enumerate() {
            let now = start + Duration::from_millis(tick as u64);
            match op {
                CacheOp::Put(request) => {
                    store.put_at(request.clone(), BadgeImage::svg("x"), now);
                    model.retain(|r| r != &request);
                    model.push(request.clone());
                    while model.len() > capacity {
                        model.remove(0);
                    }
                    touched.insert(request);
                }
                CacheOp::Get(request) => {
                    let expected = model.contains(&request);
                    prop_assert_eq!(store.get_at(&request, now).is_some(), expected);
                    prop_assert_eq!(store.is_cached_at(&request, now), expected);
                    touched.insert(request);
                }
                CacheOp::Clear => {
                    store.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(store.len(), model.len());
        }

        let end = start + Duration::from_secs(1);
        for request in &touched {
            prop_assert_eq!(store.is_cached_at(request, end), model.contains(request));
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive validity tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Entries stop being served once their validity window has elapsed.
    #[test]
    fn prop_validity_expiration(
        request in request_strategy(),
        validity_ms in 1u64..10_000,
        extra_ms in 0u64..10_000
    ) {
        let validity = Duration::from_millis(validity_ms);
        let mut store = CacheStore::new(CachePolicy::new(validity, TEST_MAX_ENTRIES));
        let start = Instant::now();

        store.put_at(request.clone(), BadgeImage::svg("x"), start);

        let before = start + validity - Duration::from_millis(1);
        prop_assert!(store.is_cached_at(&request, before));

        let after = start + validity + Duration::from_millis(extra_ms);
        prop_assert!(!store.is_cached_at(&request, after));
        prop_assert!(store.get_at(&request, after).is_none());
    }
}

// Properties of the shared handle, driven synchronously
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Through the shared handle, get returns a value exactly when is_cached holds.
    #[test]
    fn prop_shared_get_agrees_with_is_cached(
        puts in prop::collection::vec(request_strategy(), 0..30),
        probes in prop::collection::vec(request_strategy(), 1..30),
        max_entries in -1i64..8
    ) {
        let cache = ResultCache::new(CachePolicy::new(TEST_VALIDITY, max_entries));

        tokio_test::block_on(async {
            for request in puts {
                cache.put(request, BadgeImage::svg("x")).await;
            }
            for request in &probes {
                let cached = cache.is_cached(request).await;
                let value = cache.get(request).await;
                assert_eq!(value.is_some(), cached, "get/is_cached disagree for {}", request);
            }
        });
    }
}
