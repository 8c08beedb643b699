//! Backing-store providers.
//!
//! A [`DataProvider`] is the smallest contract a backing store has to meet:
//! string keys, cloneable values, and safe concurrent access from the
//! primary tick context and worker threads at the same time. Callers never
//! lock around it.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A concurrent string-keyed map holding values of type `V`.
///
/// `keys()` returns a snapshot: callers may mutate the provider while
/// walking it, and those mutations need not show up in the walk.
pub trait DataProvider<V>: Send + Sync + 'static {
    /// Whether `key` currently has an entry.
    fn contains(&self, key: &str) -> bool;

    /// The current value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Inserts or replaces the value for `key`.
    fn put(&self, key: &str, value: V);

    /// Removes `key`, returning the previous value.
    fn remove(&self, key: &str) -> Option<V>;

    /// Snapshot of all keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// MemoryProvider
// ---------------------------------------------------------------------------

/// In-process provider backed by a sharded concurrent map.
#[derive(Debug)]
pub struct MemoryProvider<V> {
    entries: DashMap<String, V>,
}

impl<V> MemoryProvider<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryProvider<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DataProvider<V> for MemoryProvider<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// TemporaryProvider
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Timed<V> {
    value: V,
    /// `None` = never expires.
    expires_at: Option<Instant>,
}

impl<V> Timed<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Provider whose entries may carry a time-to-live.
///
/// Expired entries are invisible to every read. They are dropped lazily on
/// access, or in bulk by [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct TemporaryProvider<V> {
    entries: DashMap<String, Timed<V>>,
    /// TTL applied by plain [`DataProvider::put`]. `None` = permanent.
    default_ttl: Option<Duration>,
}

impl<V> TemporaryProvider<V> {
    /// Creates a provider where `put` stores permanent entries.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl: None,
        }
    }

    /// Creates a provider where `put` stores entries that live for `ttl`.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl: Some(ttl),
        }
    }

    /// Inserts an entry that expires after `ttl`.
    pub fn put_for(&self, key: &str, value: V, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Timed {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
    }

    /// Drops every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            tracing::debug!(purged, "purged expired overlay entries");
        }
        purged
    }
}

impl<V> Default for TemporaryProvider<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DataProvider<V> for TemporaryProvider<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        // The read guard must be gone before remove_if touches the shard.
        let hit = self
            .entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match hit {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: V) {
        match self.default_ttl {
            Some(ttl) => self.put_for(key, value, ttl),
            None => {
                self.entries.insert(
                    key.to_string(),
                    Timed {
                        value,
                        expires_at: None,
                    },
                );
            }
        }
    }

    fn remove(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .and_then(|(_, entry)| entry.is_live(now).then_some(entry.value))
    }

    fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .map(|entry| entry.key().clone())
            .collect()
    }
}
