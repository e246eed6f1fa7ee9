//! Store Metrics
//!
//! Operation counters shared by every handle of a store.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    /// Lookups through get/exists
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,

    /// Keys removed because their deadline passed
    expired: AtomicU64,

    sets: AtomicU64,
    deletes: AtomicU64,

    /// set_expiration calls that installed a deadline
    expirations_applied: AtomicU64,
    /// set_expiration calls that changed nothing
    expirations_rejected: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup and whether it found a live value
    pub fn record_lookup(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record lazily purged keys
    pub fn record_expired(&self, count: usize) {
        if count > 0 {
            self.expired.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a set_expiration call
    pub fn record_expiration(&self, applied: bool) {
        if applied {
            self.expirations_applied.fetch_add(1, Ordering::Relaxed);
        } else {
            self.expirations_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    pub fn expirations_applied(&self) -> u64 {
        self.expirations_applied.load(Ordering::Relaxed)
    }

    pub fn expirations_rejected(&self) -> u64 {
        self.expirations_rejected.load(Ordering::Relaxed)
    }

    /// Hit ratio over all lookups, 0.0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            return 0.0;
        }
        self.hits() as f64 / lookups as f64
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        format!(
            "Lookups: {} (hits={}, misses={}, ratio={:.2}) | Sets: {} | Deletes: {} | Expired: {}",
            self.lookups(),
            self.hits(),
            self.misses(),
            self.hit_ratio(),
            self.sets(),
            self.deletes(),
            self.expired()
        )
    }
}
