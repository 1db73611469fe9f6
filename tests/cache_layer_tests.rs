//! Integration Tests for the Cache Layer
//!
//! Drives the public store API through quota failures, eviction, purge and
//! token refresh the way metadata fetchers use it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use media_cache::cache::{
    Authenticator, CacheEntry, CacheStore, Clock, FileMedium, IssuedToken, ManualClock,
    MemoryMedium, StorageMedium, StoreConfig, TokenCache, TokenPolicy,
};
use media_cache::error::{AuthError, MediumError};
use media_cache::{KeyKind, SetOutcome};
use serde_json::json;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

// == Helpers ==

/// Memory medium that refuses the next `fail_next` writes as quota errors.
struct ScriptedMedium {
    inner: MemoryMedium,
    fail_next: usize,
    writes: Arc<AtomicUsize>,
}

impl ScriptedMedium {
    fn new(fail_next: usize) -> Self {
        Self {
            inner: MemoryMedium::new(1 << 20),
            fail_next,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl StorageMedium for ScriptedMedium {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(MediumError::QuotaExceeded {
                needed: self.inner.used_bytes() + value.len(),
                quota: self.inner.quota_bytes(),
            });
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn used_bytes(&self) -> usize {
        self.inner.used_bytes()
    }
}

fn seed(medium: &mut impl StorageMedium, key: &str, last_accessed: u64) {
    let entry = CacheEntry {
        value: json!({"id": key}),
        expiry: u64::MAX,
        last_accessed,
    };
    medium.set_item(key, &entry.to_json().unwrap()).unwrap();
}

fn store_over<M: StorageMedium>(medium: M, clock: &ManualClock) -> CacheStore<M> {
    CacheStore::new(medium, StoreConfig::default(), Arc::new(clock.clone()))
}

// == Eviction Scenarios ==

#[test]
fn test_quota_failure_evicts_oldest_thirty_percent_and_retries() {
    let clock = ManualClock::new(1_000);
    let mut medium = ScriptedMedium::new(1);
    let writes = medium.writes.clone();

    for i in 1..=10u64 {
        seed(&mut medium.inner, KeyKind::SeasonDetails.key(i).as_str(), i);
        if i % 2 == 0 {
            // Protected entries that are older than anything ordinary
            seed(&mut medium.inner, KeyKind::WatchHistory.key(i).as_str(), 0);
        }
    }
    let mut store = store_over(medium, &clock);

    let outcome = store.set(&KeyKind::Person.key(42), &json!({"name": "Carrie"}), DAY_MS);

    assert_eq!(outcome, SetOutcome::Stored);
    assert_eq!(writes.load(Ordering::SeqCst), 2, "one failed write and one retry");
    assert_eq!(store.stats().eviction_passes, 1);
    assert_eq!(store.stats().evicted, 3);

    for i in 1..=3u64 {
        assert!(store.medium().get_item(KeyKind::SeasonDetails.key(i).as_str()).is_none());
    }
    for i in 4..=10u64 {
        assert!(store.medium().get_item(KeyKind::SeasonDetails.key(i).as_str()).is_some());
    }
    for i in [2u64, 4, 6, 8, 10] {
        assert!(store.medium().get_item(KeyKind::WatchHistory.key(i).as_str()).is_some());
    }
    assert!(store.medium().get_item("person_42").is_some());
}

#[test]
fn test_retry_then_fail_is_safe() {
    let clock = ManualClock::new(1_000);
    let medium = ScriptedMedium::new(2);
    let writes = medium.writes.clone();
    let mut store = store_over(medium, &clock);
    let key = KeyKind::Search.key("blade_runner");

    let outcome = store.set(&key, &json!([78, 335984]), DAY_MS);

    assert_eq!(outcome, SetOutcome::Failed);
    assert_eq!(writes.load(Ordering::SeqCst), 2, "exactly one retry");
    assert_eq!(store.stats().eviction_passes, 1);
    assert_eq!(store.stats().failed_writes, 1);
    assert!(store.medium().get_item(key.as_str()).is_none());

    // The caller's next read is an ordinary miss
    assert_eq!(store.get::<Vec<u64>>(&key), None);
}

#[test]
fn test_oversized_write_never_reaches_medium() {
    let clock = ManualClock::new(0);
    let medium = ScriptedMedium::new(0);
    let writes = medium.writes.clone();
    let config = StoreConfig {
        max_entry_bytes: 1024,
        ..StoreConfig::default()
    };
    let mut store = CacheStore::new(medium, config, Arc::new(clock));

    let cast: Vec<String> = (0..200).map(|i| format!("actor {}", i)).collect();
    let outcome = store.set(&KeyKind::Credits.key("tv_1399"), &cast, DAY_MS);

    assert!(matches!(outcome, SetOutcome::Rejected { limit: 1024, .. }));
    assert_eq!(writes.load(Ordering::SeqCst), 0);
    assert_eq!(store.stats().eviction_passes, 0);
}

#[test]
fn test_real_quota_pressure_keeps_user_data() {
    let clock = ManualClock::new(0);
    let mut store = CacheStore::new(
        MemoryMedium::new(4 * 1024),
        StoreConfig::default(),
        Arc::new(clock.clone()),
    );

    let watchlist = KeyKind::Watchlist.key("u1");
    assert!(store.set(&watchlist, &json!([603, 604, 605]), 365 * DAY_MS).is_stored());

    for i in 0..200u64 {
        clock.advance(1);
        let outcome = store.set(&KeyKind::ExternalLookup.key(i), &json!({"tvdb": i}), DAY_MS);
        assert!(outcome.is_stored(), "lookup {} not stored", i);
    }

    assert!(store.stats().eviction_passes > 0);
    assert!(store.used_bytes() <= 4 * 1024);
    assert_eq!(store.get::<Vec<u32>>(&watchlist), Some(vec![603, 604, 605]));
}

#[test]
fn test_never_read_entries_rank_oldest() {
    // Entries without an access stamp sort before everything else, even if
    // they were written last
    let clock = ManualClock::new(1_000);
    let mut medium = ScriptedMedium::new(1);
    for i in 1..=3u64 {
        seed(&mut medium.inner, KeyKind::Search.key(i).as_str(), 500 + i);
    }
    medium
        .inner
        .set_item("search_fresh", r#"{"value":"new","expiry":999999}"#)
        .unwrap();
    let mut store = store_over(medium, &clock);

    store.set(&KeyKind::Person.key(1), "p", DAY_MS);

    // ceil(0.3 * 4) = 2: the stampless entry, then the oldest stamped one
    assert!(store.medium().get_item("search_fresh").is_none());
    assert!(store.medium().get_item("search_1").is_none());
    assert!(store.medium().get_item("search_2").is_some());
}

// == Purge ==

#[test]
fn test_purge_then_refetch_cycle() {
    let clock = ManualClock::new(0);
    let mut store = store_over(MemoryMedium::new(1 << 20), &clock);
    let credits = KeyKind::Credits.key("movie_603");
    let details = KeyKind::MovieDetails.key(603);
    let season = KeyKind::SeasonDetails.key("1399_1");

    store.set(&credits, &json!(["Keanu Reeves"]), DAY_MS);
    store.set(&details, &json!({"title": "The Matrix"}), DAY_MS);
    store.set(&season, &json!({"episodes": 10}), DAY_MS);

    assert_eq!(store.purge_secondary(), 1);
    assert_eq!(store.purge_secondary(), 0);

    assert!(store.get_raw(&credits).is_none());
    assert!(store.get_raw(&details).is_some());
    assert!(store.get_raw(&season).is_some());

    // Recomputed secondary data can be cached again
    assert!(store.set(&credits, &json!(["Keanu Reeves"]), DAY_MS).is_stored());
}

// == Persistence ==

#[test]
fn test_file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let clock = ManualClock::new(10_000);
    let key = KeyKind::WatchProgress.key("u1_1399");

    {
        let medium = FileMedium::open(&path, 1 << 20).unwrap();
        let mut store = store_over(medium, &clock);
        assert!(store.set(&key, &json!({"season": 2, "episode": 5}), DAY_MS).is_stored());
    }

    let medium = FileMedium::open(&path, 1 << 20).unwrap();
    let mut store = store_over(medium, &clock);
    let progress = store.get_raw(&key).unwrap();
    assert_eq!(progress["episode"], 5);
}

// == Token Cache ==

struct StaticIssuer {
    clock: ManualClock,
    calls: Arc<AtomicUsize>,
}

impl Authenticator for StaticIssuer {
    async fn authenticate(&self, _issuer: &str) -> Result<IssuedToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IssuedToken {
            token: format!("jwt-{}", n),
            issued_at_ms: self.clock.now_ms(),
        })
    }
}

#[tokio::test]
async fn test_token_survives_eviction_and_refreshes_at_margin() {
    let clock = ManualClock::new(0);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut store = store_over(ScriptedMedium::new(0), &clock);
    let tokens = TokenCache::new(
        StaticIssuer {
            clock: clock.clone(),
            calls: calls.clone(),
        },
        TokenPolicy {
            validity_window_ms: 30 * DAY_MS,
            safety_margin_ms: 2 * DAY_MS,
        },
    );

    let token = tokens.get_token(&mut store, "tvdb").await.unwrap();

    // Force an eviction pass over a store holding only the token and lookups
    for i in 0..5u64 {
        store.set(&KeyKind::ExternalLookup.key(i), &i, DAY_MS);
    }
    store.medium_mut().fail_next = 1;
    store.set(&KeyKind::Search.key("x"), "x", DAY_MS);
    assert_eq!(store.stats().eviction_passes, 1);

    clock.set(10 * DAY_MS);
    assert_eq!(tokens.get_token(&mut store, "tvdb").await.unwrap(), token);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.set(29 * DAY_MS);
    let refreshed = tokens.get_token(&mut store, "tvdb").await.unwrap();
    assert_ne!(refreshed, token);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
