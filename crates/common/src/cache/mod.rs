//! In-process TTL cache
//!
//! Provides:
//! - Generic get/set operations with per-entry TTL
//! - Lazy expiry on read
//! - Periodic background sweep to bound memory
//! - Load-through helper for cache-aside callers
//!
//! Entries are owned exclusively by the cache: callers never evict, entries
//! disappear either on an expired read or during a sweep. Correctness does
//! not depend on the sweeper running.

use crate::errors::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// A mutex-guarded key/value store with bounded entry lifetimes
pub struct MemoryCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    default_ttl: Duration,
}

impl<T: Clone + Send + 'static> MemoryCache<T> {
    /// Create a cache whose `set` calls use `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a value; an expired entry behaves as absent and is dropped
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) => {
                if entry.expires_at > Instant::now() {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    /// Store a value with the default TTL
    pub fn set(&self, key: &str, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with a custom TTL
    pub fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    /// Number of stored entries, including not-yet-swept expired ones
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Run `sweep` on a fixed interval from a background task
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped, so it never extends the cache's lifetime.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else { break };
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }

    /// Get a value, or compute and store it with the default TTL
    pub async fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = loader().await?;
        self.set(key, value.clone());
        Ok(value)
    }
}
