//! Per-key cooldown tracking.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// Longest block a key can get; larger durations are clamped to it.
pub const MAX_BLOCK: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// In-memory map from key to the instant its block expires.
///
/// A key is blocked while `now < expiry`. Entries are only ever written by
/// [`block`](Self::block); expiry is a plain time comparison, and
/// [`purge_expired`](Self::purge_expired) may drop stale entries.
#[derive(Debug, Clone)]
pub struct CooldownTracker<K> {
    expiries: HashMap<K, Instant>,
}

impl<K> Default for CooldownTracker<K> {
    fn default() -> Self {
        Self {
            expiries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> CooldownTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a block on `key` is still in effect.
    pub fn is_blocked<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.is_blocked_at(key, Instant::now())
    }

    /// Same as [`is_blocked`](Self::is_blocked), evaluated at `now`.
    pub fn is_blocked_at<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.expiries.get(key).is_some_and(|expiry| now < *expiry)
    }

    /// Blocks `key` for `duration` from now, overwriting any earlier block.
    pub fn block(&mut self, key: K, duration: Duration) {
        self.block_at(key, duration, Instant::now());
    }

    /// Same as [`block`](Self::block), starting at `now`.
    pub fn block_at(&mut self, key: K, duration: Duration, now: Instant) {
        let expiry = now
            .checked_add(duration.min(MAX_BLOCK))
            .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 60 * 60));
        self.expiries.insert(key, expiry);
    }

    /// Drops entries whose block has run out.
    pub fn purge_expired(&mut self) {
        self.purge_expired_at(Instant::now());
    }

    pub fn purge_expired_at(&mut self, now: Instant) {
        self.expiries.retain(|_, expiry| now < *expiry);
    }

    /// Number of tracked entries, expired or not.
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}
