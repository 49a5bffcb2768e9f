use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::CacheStore;

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub source: Source,
}

/// Read-through cache over one key namespace.
///
/// Every invalidation bumps an epoch before deleting keys. A load that
/// overlapped an invalidation does not keep its result in the cache, so a
/// read that starts after a write has returned never sees pre-write data.
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
    namespace: String,
    ttl: Duration,
    epoch: AtomicU64,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Serve `key` from the cache, or run `load` and remember its result.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &str, load: F) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    tracing::debug!(cache.key = %key, "Cache hit");
                    return Ok(Cached {
                        value,
                        source: Source::Cache,
                    });
                }
                Err(e) => {
                    tracing::warn!(cache.key = %key, error = %e, "Discarding undecodable cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(cache.key = %key, "Cache miss");
            }
            Err(e) => {
                tracing::warn!(cache.key = %key, error = %e, "Cache read failed; using database");
            }
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let value = load().await?;

        if self.epoch.load(Ordering::Acquire) == epoch {
            self.fill(key, &value).await;
            // An invalidation may have landed between the check and the write.
            if self.epoch.load(Ordering::Acquire) != epoch {
                if let Err(e) = self.store.delete(key).await {
                    tracing::warn!(cache.key = %key, error = %e, "Failed to drop raced cache entry");
                }
            }
        } else {
            tracing::debug!(cache.key = %key, "Namespace invalidated during load; not caching");
        }

        Ok(Cached {
            value,
            source: Source::Database,
        })
    }

    async fn fill<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(cache.key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, bytes, self.ttl).await {
            tracing::warn!(cache.key = %key, error = %e, "Cache write failed");
        }
    }

    /// Drop every entry in the namespace. Failures are logged; the TTL bounds
    /// how long a missed invalidation can be observed.
    pub async fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);

        match self.store.invalidate_namespace(&self.namespace).await {
            Ok(removed) => {
                tracing::debug!(cache.namespace = %self.namespace, removed = removed, "Cache namespace invalidated");
            }
            Err(e) => {
                tracing::warn!(cache.namespace = %self.namespace, error = %e, "Cache invalidation failed");
            }
        }
    }
}
