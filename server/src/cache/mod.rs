mod memory_store;
mod noop_store;
mod redis_store;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

pub use memory_store::MemoryCacheStore;
pub use noop_store::NoopCacheStore;
pub use redis_store::RedisCacheStore;

#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> anyhow::Result<()>;

    async fn del(&self, key: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
    degraded: Arc<AtomicBool>,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCacheStore))
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::default()))
    }

    pub fn redis(redis_url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(RedisCacheStore::from_url(redis_url)?)))
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.observe(self.store.get(key).await, "get", key)??;

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cache_key = key, "failed to deserialize cached value, treating as miss: {e}");
                None
            }
        }
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> bool
    where
        T: Serialize,
    {
        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(cache_key = key, "failed to serialize value for cache: {e}");
                return false;
            }
        };

        self.observe(self.store.set(key, payload, ttl).await, "set", key)
            .is_some()
    }

    pub async fn del(&self, key: &str) -> bool {
        self.observe(self.store.del(key).await, "del", key).is_some()
    }

    /// Logs the first failure after a healthy period and the first success
    /// after a failing one, so an unreachable backend does not flood the logs.
    fn observe<T>(&self, result: anyhow::Result<T>, operation: &str, key: &str) -> Option<T> {
        match result {
            Ok(value) => {
                if self.degraded.swap(false, Ordering::Relaxed) {
                    info!(backend = self.backend(), "cache backend recovered");
                }
                Some(value)
            }
            Err(e) => {
                if self.degraded.swap(true, Ordering::Relaxed) {
                    debug!(cache_key = key, "cache {operation} failed: {e:#}");
                } else {
                    warn!(
                        backend = self.backend(),
                        cache_key = key,
                        "cache {operation} failed, running without cache: {e:#}"
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn del(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn failing_backend_degrades_to_miss() {
        let cache = CacheService::new(Arc::new(BrokenStore));

        assert!(!cache.set_json("k", &1u32, Duration::from_secs(60)).await);
        assert_eq!(cache.get_json::<u32>("k").await, None);
        assert!(!cache.del("k").await);
        assert!(cache.degraded.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = CacheService::disabled();

        assert!(cache.set_json("k", &"v", Duration::from_secs(60)).await);
        assert_eq!(cache.get_json::<String>("k").await, None);
        assert_eq!(cache.backend(), "disabled");
    }

    #[tokio::test]
    async fn undecodable_value_is_a_miss() {
        let cache = CacheService::memory();
        cache
            .store
            .set("k", b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get_json::<u32>("k").await, None);
    }

    #[tokio::test]
    async fn values_round_trip_through_memory() {
        let cache = CacheService::memory();

        assert!(cache.set_json("k", &vec![1, 2, 3], Duration::from_secs(60)).await);
        assert_eq!(cache.get_json::<Vec<i32>>("k").await, Some(vec![1, 2, 3]));
        assert!(cache.del("k").await);
        assert_eq!(cache.get_json::<Vec<i32>>("k").await, None);
    }
}
