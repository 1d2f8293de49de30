//! Typed in-memory store with absolute time-to-live
//!
//! Entries expire a fixed duration after they are written; reads never extend
//! that. Expired entries are invisible to readers immediately and are removed
//! either lazily on lookup or by the periodic sweeper.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use super::stats::{CacheCounters, CacheStats};

#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Concurrent key/value store whose entries expire after a fixed TTL
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    counters: CacheCounters,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create an empty store
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            counters: CacheCounters::default(),
        }
    }

    /// Time-to-live applied to new entries
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                self.counters.record_hit();
                return Some(Arc::clone(&entry.value));
            }
        }

        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_live(now))
            .is_some()
        {
            debug!("Dropped expired cache entry for {:?}", key);
            self.counters.record_evictions(1);
        }
        self.counters.record_miss();
        None
    }

    /// Look up a live entry without touching the hit and miss counters
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Store a value with the default TTL, replacing any previous entry
    pub fn insert(&self, key: K, value: Arc<V>) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// Store a value with an explicit TTL
    pub fn insert_with_ttl(&self, key: K, value: Arc<V>, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key, entry);
        self.counters.record_insertion();
    }

    /// Remove every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });
        self.counters.record_evictions(removed);
        removed
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of cache activity
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Start the periodic sweep of expired entries
    ///
    /// The task runs until a shutdown signal arrives or the sender is dropped.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!("Cache sweep removed {} expired entries", removed);
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Cache sweeper received shutdown signal");
                        break;
                    }
                }
            }
        })
    }
}
