//! TTL cache implementation

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::debug;

/// A cached value with its absolute expiry
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Key-scoped mutex shared by every caller currently working on that key
type KeyLock = Arc<AsyncMutex<()>>;

/// Concurrency-safe memoization with per-key expiry and single-flight refresh
///
/// Fresh reads take a shared read lock on the entry table and never wait on a
/// computation. A miss serializes through a mutex scoped to the key, so only
/// one computation per key is in flight at a time. The per-key mutex is
/// dropped from the lock table once nobody holds or waits on it.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    locks: Mutex<HashMap<K, KeyLock>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Return the fresh value for `key` without computing or waiting
    pub fn try_get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Return the fresh value for `key`, computing and storing it on a miss
    ///
    /// Among concurrent callers for the same key, `compute` runs once; the
    /// others wait and then observe the stored value. A failed computation
    /// stores nothing and its error goes back to the caller that ran it, after
    /// which the next waiter gets its own attempt.
    pub async fn get_or_add<F, Fut, E>(&self, key: K, compute: F, ttl: Duration) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.try_get(&key) {
            return Ok(value);
        }

        let slot = self.acquire(&key);
        let _permit = slot.lock.lock().await;

        // Another caller may have refreshed the entry while we waited.
        if let Some(value) = self.try_get(&key) {
            debug!("Cache entry refreshed by a concurrent caller");
            return Ok(value);
        }

        debug!("Cache miss, computing value (ttl {:?})", ttl);
        let value = compute().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    /// Drop the entry for `key`, forcing the next `get_or_add` to recompute
    pub fn invalidate(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, entry);
    }

    fn acquire(&self, key: &K) -> LockSlot<'_, K, V> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        );
        LockSlot {
            cache: self,
            key: key.clone(),
            lock,
        }
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.try_read().map(|e| e.len()).unwrap_or_default();
        let locks = self.locks.try_lock().map(|l| l.len()).unwrap_or_default();
        f.debug_struct("TtlCache")
            .field("entries", &entries)
            .field("key_locks", &locks)
            .finish()
    }
}

/// A caller's handle on a key lock
///
/// Dropping the last handle removes the lock from the table. Runs on every
/// exit path, including when the owning future is dropped mid-computation.
struct LockSlot<'a, K, V>
where
    K: Eq + Hash,
{
    cache: &'a TtlCache<K, V>,
    key: K,
    lock: KeyLock,
}

impl<K, V> Drop for LockSlot<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut locks = self
            .cache
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // The table holds one reference and this slot another; anything more
        // means a caller is still waiting on this key.
        let unused = locks
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2);
        if unused {
            locks.remove(&self.key);
        }
    }
}
