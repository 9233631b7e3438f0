//! Remote tier: the shared key/value backend and the adapter that keeps its
//! failures away from callers.

mod noop;
mod redis;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CacheError, Result};

pub use self::noop::NoopStore;
pub use self::redis::RedisStore;

/// Contract for a shared key/value backend.
///
/// Every operation may fail; the engine only ever reaches a backend through
/// [`RemoteTier`], which turns those failures into soft misses.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Get a value from the backend.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value. A zero TTL stores it without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove a value; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every value this store owns.
    async fn clear(&self) -> Result<()>;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Picks the backend for the given configuration.
///
/// No URL means memory-only mode. An unusable URL is logged and also falls
/// back to memory-only mode rather than failing startup.
pub fn connect_remote(config: &Config) -> Arc<dyn RemoteStore> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("Redis URL not provided, using memory-only cache");
        return Arc::new(NoopStore::new());
    };

    match RedisStore::new(url, config) {
        Ok(store) => {
            info!(namespace = %config.namespace, "Shared cache backend configured");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to initialise shared cache backend, using memory-only cache");
            Arc::new(NoopStore::new())
        }
    }
}

// == Remote Tier ==
/// Best-effort wrapper around a [`RemoteStore`].
///
/// Errors and timeouts are logged and counted, never returned.
pub struct RemoteTier {
    store: Arc<dyn RemoteStore>,
    timeout: Option<Duration>,
    failures: AtomicU64,
}

impl RemoteTier {
    pub fn new(store: Arc<dyn RemoteStore>, timeout: Option<Duration>) -> Self {
        Self {
            store,
            timeout,
            failures: AtomicU64::new(0),
        }
    }

    /// Replaces the per-operation timeout.
    pub fn with_timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    /// Returns the value on a hit; misses and failures both yield `None`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.guard(self.store.get(key)).await {
            Ok(value) => value,
            Err(e) => {
                self.record_failure("get", key, &e);
                None
            }
        }
    }

    /// Returns whether the backend accepted the write.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> bool {
        match self.guard(self.store.set(key, value, ttl)).await {
            Ok(()) => {
                debug!(key, backend = self.store.name(), "Cache set in remote tier");
                true
            }
            Err(e) => {
                self.record_failure("set", key, &e);
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        match self.guard(self.store.delete(key)).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure("delete", key, &e);
                false
            }
        }
    }

    pub async fn clear(&self) -> bool {
        match self.guard(self.store.clear()).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure("clear", "*", &e);
                false
            }
        }
    }

    /// Number of remote operations that failed or timed out.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    async fn guard<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, op).await {
                Ok(result) => result,
                Err(_) => Err(CacheError::Timeout(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                )),
            },
            None => op.await,
        }
    }

    fn record_failure(&self, op: &'static str, key: &str, error: &CacheError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            op,
            key,
            backend = self.store.name(),
            error = %error,
            "Remote cache operation failed, continuing with local tier only"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    #[async_trait]
    impl RemoteStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(CacheError::Connection("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
            Err(CacheError::Backend("READONLY".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(CacheError::Backend("READONLY".to_string()))
        }

        async fn clear(&self) -> Result<()> {
            Err(CacheError::Connection("connection refused".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl RemoteStore for SlowStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(b"late".to_vec()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failures_are_soft() {
        let tier = RemoteTier::new(Arc::new(BrokenStore), None);

        assert_eq!(tier.get("k").await, None);
        assert!(!tier.set("k", b"v".to_vec(), Duration::from_secs(1)).await);
        assert!(!tier.delete("k").await);
        assert!(!tier.clear().await);
        assert_eq!(tier.failures(), 4);
    }

    #[tokio::test]
    async fn test_timeout_is_a_soft_miss() {
        let tier = RemoteTier::new(Arc::new(SlowStore), Some(Duration::from_millis(20)));

        assert_eq!(tier.get("k").await, None);
        assert_eq!(tier.failures(), 1);
    }

    #[tokio::test]
    async fn test_noop_tier_never_fails() {
        let tier = RemoteTier::new(Arc::new(NoopStore::new()), None);

        assert_eq!(tier.get("k").await, None);
        assert!(tier.set("k", b"v".to_vec(), Duration::ZERO).await);
        assert!(tier.delete("k").await);
        assert!(tier.clear().await);
        assert_eq!(tier.failures(), 0);
        assert_eq!(tier.backend_name(), "noop");
    }

    #[test]
    fn test_connect_without_url_is_memory_only() {
        let store = connect_remote(&Config::default());
        assert_eq!(store.name(), "noop");
    }

    #[test]
    fn test_connect_with_invalid_url_falls_back() {
        let config = Config {
            redis_url: Some("definitely not a url".to_string()),
            ..Config::default()
        };
        assert_eq!(connect_remote(&config).name(), "noop");
    }
}
