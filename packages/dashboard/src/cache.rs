//! Time-based memoization keyed by request URL.
//!
//! Entries live behind an async mutex that stays held while a producer
//! runs, so concurrent callers for a missing key wait for the first fetch
//! instead of starting their own.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Whole-value cache with a fixed time-to-live per entry.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<BTreeMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the stored value for `key` if it is younger than the TTL,
    /// otherwise runs `producer` and stores its result.
    ///
    /// # Errors
    ///
    /// Returns the producer's error. Failed results are not stored.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: &str, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;
        self.compute_locked(&mut entries, key, Instant::now(), producer)
            .await
    }

    /// Same as [`Self::get_or_try_compute`], evaluating freshness at `now`.
    ///
    /// # Errors
    ///
    /// Returns the producer's error. Failed results are not stored.
    pub async fn get_or_try_compute_at<F, Fut, E>(
        &self,
        key: &str,
        now: Instant,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;
        self.compute_locked(&mut entries, key, now, producer).await
    }

    async fn compute_locked<F, Fut, E>(
        &self,
        entries: &mut BTreeMap<String, CacheEntry<V>>,
        key: &str,
        now: Instant,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(entry) = entries.get(key)
            && now.saturating_duration_since(entry.stored_at) < self.ttl
        {
            log::debug!("Cache hit for {key}");
            return Ok(entry.value.clone());
        }

        log::debug!("Cache miss for {key}");
        let value = producer().await?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                stored_at: now,
            },
        );
        Ok(value)
    }

    /// Drops the entry for `key`. Returns `true` if one was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
