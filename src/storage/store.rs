//! In-Memory Key-Value Store
//!
//! Thread-safe string map with per-key deadlines and lazy expiration.
//!
//! Values and deadlines live in two maps behind one mutex, so they are always
//! read and written together. Nothing sweeps in the background: an expired key
//! is purged by whichever operation next looks at it.

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use crate::metrics::Metrics;

/// TTLs are capped at roughly a century so deadlines never overflow `Instant`
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Result of [`Store::set_expiration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireOutcome {
    /// Deadline installed
    Applied,
    /// Key is absent or already expired
    NotFound,
    /// TTL of zero, nothing to do
    NoExpiration,
    /// Key already has a deadline, left unchanged
    AlreadySet,
}

impl ExpireOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

fn deadline(now: Instant, ttl_secs: u64) -> Instant {
    now + Duration::from_secs(ttl_secs.min(MAX_TTL_SECS))
}

/// Both maps, always locked as one unit.
///
/// Every key in `expirations` is also in `values`.
#[derive(Debug, Default)]
struct Tables {
    values: HashMap<String, String>,
    expirations: HashMap<String, Instant>,
}

impl Tables {
    fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.expirations
            .get(key)
            .map(|deadline| now > *deadline)
            .unwrap_or(false)
    }

    /// Drop `key` if its deadline has passed
    fn purge_if_expired(&mut self, key: &str, now: Instant) -> bool {
        if self.is_expired(key, now) {
            self.remove(key);
            true
        } else {
            false
        }
    }

    /// Drop every key whose deadline has passed, returns count
    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .expirations
            .iter()
            .filter(|(_, deadline)| now > **deadline)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    fn remove(&mut self, key: &str) -> bool {
        self.expirations.remove(key);
        self.values.remove(key).is_some()
    }
}

/// Thread-safe in-memory key-value store
///
/// Cloning yields another handle to the same tables. Every operation takes
/// the single store lock for its whole critical section, so operations are
/// fully serialized, reads included.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a new empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty store reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tables::default())),
            clock,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Set key-value pair.
    ///
    /// A positive `ttl_secs` replaces any existing deadline with
    /// `now + ttl_secs`. Zero leaves an existing deadline in place.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl_secs: u64) {
        let key = key.into();
        let now = self.clock.now();
        {
            let mut tables = self.inner.lock();
            if ttl_secs > 0 {
                tables.expirations.insert(key.clone(), deadline(now, ttl_secs));
            }
            tables.values.insert(key.clone(), value.into());
        }
        self.metrics.record_set();
        trace!(key = %key, ttl_secs, "Set key");
    }

    /// Get value by key, `None` if the key is absent or expired.
    ///
    /// An expired key is purged before returning.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let (value, purged) = {
            let mut tables = self.inner.lock();
            if tables.purge_if_expired(key, now) {
                (None, true)
            } else {
                (tables.values.get(key).cloned(), false)
            }
        };
        self.note_purge(key, purged);
        self.metrics.record_lookup(value.is_some());
        value
    }

    /// Delete key, returns true if a live value was removed.
    ///
    /// Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) -> bool {
        let now = self.clock.now();
        let removed = {
            let mut tables = self.inner.lock();
            let live = !tables.is_expired(key, now);
            tables.remove(key) && live
        };
        self.metrics.record_delete();
        trace!(key = %key, removed, "Deleted key");
        removed
    }

    /// Check if key exists and is not expired. Agrees with [`Store::get`].
    pub fn exists(&self, key: &str) -> bool {
        let now = self.clock.now();
        let (exists, purged) = {
            let mut tables = self.inner.lock();
            let purged = tables.purge_if_expired(key, now);
            (tables.values.contains_key(key), purged)
        };
        self.note_purge(key, purged);
        self.metrics.record_lookup(exists);
        exists
    }

    /// Snapshot of all live keys, in no particular order.
    ///
    /// Expired entries met during the scan are purged.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let (keys, purged) = {
            let mut tables = self.inner.lock();
            let purged = tables.purge_expired(now);
            let keys: Vec<String> = tables.values.keys().cloned().collect();
            (keys, purged)
        };
        if purged > 0 {
            debug!(purged, "Purged expired keys during scan");
            self.metrics.record_expired(purged);
        }
        keys
    }

    /// Give a deadline to a key that has none.
    ///
    /// Never overwrites an existing deadline, unlike [`Store::set`].
    pub fn set_expiration(&self, key: &str, ttl_secs: u64) -> ExpireOutcome {
        let now = self.clock.now();
        let (outcome, purged) = {
            let mut tables = self.inner.lock();
            let purged = tables.purge_if_expired(key, now);
            let outcome = if !tables.values.contains_key(key) {
                ExpireOutcome::NotFound
            } else if ttl_secs == 0 {
                ExpireOutcome::NoExpiration
            } else if tables.expirations.contains_key(key) {
                ExpireOutcome::AlreadySet
            } else {
                tables
                    .expirations
                    .insert(key.to_owned(), deadline(now, ttl_secs));
                ExpireOutcome::Applied
            };
            (outcome, purged)
        };
        self.note_purge(key, purged);
        self.metrics.record_expiration(outcome.is_applied());
        debug!(key = %key, ttl_secs, ?outcome, "Set expiration");
        outcome
    }

    /// Get the number of entries (including expired ones not yet purged)
    pub fn len(&self) -> usize {
        self.inner.lock().values.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters shared by every handle to this store
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn note_purge(&self, key: &str, purged: bool) {
        if purged {
            debug!(key = %key, "Purged expired key");
            self.metrics.record_expired(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ManualClock;
    use std::thread;

    fn manual_store() -> (Store, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (Store::with_clock(clock.clone()), clock)
    }

    fn sorted_keys(store: &Store) -> Vec<String> {
        let mut keys = store.keys();
        keys.sort();
        keys
    }

    #[test]
    fn test_basic_operations() {
        let store = Store::new();

        // Set and get
        store.set("key", "value", 0);
        assert_eq!(store.get("key"), Some("value".to_string()));

        // Exists
        assert!(store.exists("key"));

        // Delete
        assert!(store.delete("key"));
        assert!(!store.exists("key"));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let store = Store::new();
        assert!(!store.delete("ghost"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites_value() {
        let store = Store::new();
        store.set("k", "one", 0);
        store.set("k", "two", 0);
        assert_eq!(store.get("k"), Some("two".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_key_and_value() {
        let store = Store::new();
        store.set("", "", 0);
        assert_eq!(store.get(""), Some(String::new()));
        assert!(store.exists(""));
    }

    #[test]
    fn test_ttl_expiration() {
        let (store, clock) = manual_store();

        store.set("expiring", "temporary", 5);
        assert_eq!(store.get("expiring"), Some("temporary".to_string()));

        // Deadline itself is still live; strictly past it is not
        clock.advance_secs(5);
        assert_eq!(store.get("expiring"), Some("temporary".to_string()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.get("expiring"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_ttl_expiration_real_time() {
        let store = Store::new();
        store.set("expiring", "temporary", 1);
        assert!(store.exists("expiring"));

        thread::sleep(Duration::from_millis(1100));
        assert_eq!(store.get("expiring"), None);
    }

    #[test]
    fn test_set_with_ttl_resets_deadline() {
        let (store, clock) = manual_store();

        store.set("k", "v1", 2);
        clock.advance_secs(1);
        store.set("k", "v2", 10);
        clock.advance_secs(5);
        assert_eq!(store.get("k"), Some("v2".to_string()));

        clock.advance_secs(6);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_set_without_ttl_keeps_existing_deadline() {
        let (store, clock) = manual_store();

        store.set("k", "v1", 3);
        store.set("k", "v2", 0);
        assert_eq!(store.get("k"), Some("v2".to_string()));

        clock.advance_secs(4);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_delete_clears_deadline() {
        let (store, clock) = manual_store();

        store.set("k", "v", 2);
        store.delete("k");
        store.set("k", "again", 0);

        clock.advance_secs(10);
        assert_eq!(store.get("k"), Some("again".to_string()));
    }

    #[test]
    fn test_delete_expired_key_reports_not_removed() {
        let (store, clock) = manual_store();

        store.set("k", "v", 1);
        clock.advance_secs(2);
        assert!(!store.delete("k"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_exists_agrees_with_get_after_expiry() {
        let (store, clock) = manual_store();

        store.set("k", "v", 1);
        clock.advance_secs(2);

        // No get has run yet, exists must still see the key as gone
        assert_eq!(store.len(), 1);
        assert!(!store.exists("k"));
        assert_eq!(store.len(), 0);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_keys_skips_and_purges_expired() {
        let (store, clock) = manual_store();

        store.set("permanent", "1", 0);
        store.set("short", "2", 1);
        store.set("long", "3", 100);
        clock.advance_secs(2);

        assert_eq!(sorted_keys(&store), vec!["long", "permanent"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.metrics().expired(), 1);
    }

    #[test]
    fn test_set_expiration_on_missing_key() {
        let store = Store::new();
        assert_eq!(store.set_expiration("missing", 5), ExpireOutcome::NotFound);
        assert!(!store.exists("missing"));
    }

    #[test]
    fn test_set_expiration_zero_is_noop() {
        let (store, clock) = manual_store();

        store.set("k", "v", 0);
        assert_eq!(store.set_expiration("k", 0), ExpireOutcome::NoExpiration);
        clock.advance_secs(1_000);
        assert!(store.exists("k"));

        // Zero does not clear an existing deadline either
        store.set("t", "v", 2);
        assert_eq!(store.set_expiration("t", 0), ExpireOutcome::NoExpiration);
        clock.advance_secs(3);
        assert!(!store.exists("t"));
    }

    #[test]
    fn test_set_expiration_applies_once() {
        let (store, clock) = manual_store();

        store.set("k", "v", 0);
        assert_eq!(store.set_expiration("k", 3), ExpireOutcome::Applied);
        assert_eq!(store.set_expiration("k", 100), ExpireOutcome::AlreadySet);

        clock.advance_secs(2);
        assert!(store.exists("k"));

        // Original deadline of 3s is kept
        clock.advance_secs(2);
        assert_eq!(store.get("k"), None);

        assert_eq!(store.metrics().expirations_applied(), 1);
        assert_eq!(store.metrics().expirations_rejected(), 1);
    }

    #[test]
    fn test_set_expiration_on_expired_key_is_not_found() {
        let (store, clock) = manual_store();

        store.set("k", "v", 1);
        clock.advance_secs(2);
        assert_eq!(store.set_expiration("k", 5), ExpireOutcome::NotFound);
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let (store, clock) = manual_store();

        store.set("k", "v", u64::MAX);
        clock.advance_secs(365 * 24 * 60 * 60);
        assert!(store.exists("k"));

        store.set("j", "v", 0);
        assert_eq!(store.set_expiration("j", u64::MAX), ExpireOutcome::Applied);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (store, clock) = manual_store();

        store.set("a", "1", 0);
        store.set("b", "2", 5);
        assert_eq!(store.get("a"), Some("1".to_string()));
        assert_eq!(store.get("b"), Some("2".to_string()));

        clock.advance_secs(6);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_clones_share_tables() {
        let store = Store::new();
        let other = store.clone();

        other.set("shared", "yes", 0);
        assert_eq!(store.get("shared"), Some("yes".to_string()));
        assert_eq!(store.metrics().sets(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let store = Store::new();

        // Spawn multiple threads writing disjoint keys concurrently
        crossbeam::scope(|s| {
            for i in 0..10 {
                let store = &store;
                s.spawn(move |_| {
                    for j in 0..100 {
                        let key = format!("key-{}-{}", i, j);
                        let value = format!("value-{}-{}", i, j);
                        store.set(key.clone(), value.clone(), 0);
                        assert_eq!(store.get(&key), Some(value));
                        if j % 2 == 0 {
                            store.delete(&key);
                            assert!(!store.exists(&key));
                        }
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(store.len(), 500);
        let keys = store.keys();
        assert_eq!(keys.len(), 500);
        assert!(keys.iter().all(|k| {
            let j: usize = k.rsplit('-').next().unwrap().parse().unwrap();
            j % 2 == 1
        }));
    }

    #[test]
    fn test_concurrent_scans_and_writes() {
        let (store, clock) = manual_store();
        for i in 0..100 {
            store.set(format!("ttl-{}", i), "v", 1);
        }

        crossbeam::scope(|s| {
            let store = &store;
            let clock = &clock;
            s.spawn(move |_| {
                for i in 0..200 {
                    store.set(format!("w-{}", i), "v", 0);
                }
            });
            s.spawn(move |_| {
                clock.advance_secs(2);
                for _ in 0..50 {
                    let _ = store.keys();
                }
            });
        })
        .unwrap();

        let keys = store.keys();
        assert_eq!(keys.len(), 200);
        assert!(keys.iter().all(|k| k.starts_with("w-")));
    }
}
