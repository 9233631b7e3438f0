//! Read-through / invalidate-on-write interception.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::cache::{CacheEngine, CacheKey};
use crate::intercept::{RequestInfo, RequestKind, RoutePolicy};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache; the handler did not run
    Hit,
    /// Produced by the handler and queued for caching
    Miss,
    /// Produced by the handler of a mutating request; never cached
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// A handler result together with its cache status.
#[derive(Debug, Clone, PartialEq)]
pub struct Intercepted<T> {
    pub value: T,
    pub status: CacheStatus,
}

// == Cache Interceptor ==
/// Applies the caching policy around a request handler.
///
/// Writes after a miss run on their own tasks so they never delay the
/// response and are not cancelled with the request.
#[derive(Clone)]
pub struct CacheInterceptor {
    engine: Arc<CacheEngine>,
    pending: TaskTracker,
    // Serializes close/wait/reopen so one flush cannot reopen the tracker
    // under another that is still waiting
    flushing: Arc<Mutex<()>>,
}

impl CacheInterceptor {
    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self {
            engine,
            pending: TaskTracker::new(),
            flushing: Arc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &Arc<CacheEngine> {
        &self.engine
    }

    /// Runs `handler` under the route's cache policy.
    ///
    /// Mutations invalidate the route's tags before the handler runs. Reads
    /// return a cached value when one exists; otherwise the handler's result
    /// is cached in the background. Handler errors pass through uncached.
    pub async fn intercept<T, E, F, Fut>(
        &self,
        request: &RequestInfo,
        policy: &RoutePolicy,
        handler: F,
    ) -> Result<Intercepted<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match request.kind() {
            RequestKind::Mutation => {
                if !policy.tags.is_empty() {
                    self.engine.invalidate_tags(&policy.tags).await;
                }
                let value = handler().await?;
                Ok(Intercepted {
                    value,
                    status: CacheStatus::Bypass,
                })
            }
            RequestKind::Read => {
                let key = request.cache_key();
                if let Some(value) = self.engine.get_json::<T>(key.as_str()).await {
                    debug!(key = %key, path = %request.path, "Serving cached response");
                    return Ok(Intercepted {
                        value,
                        status: CacheStatus::Hit,
                    });
                }

                let value = handler().await?;
                match serde_json::to_vec(&value) {
                    Ok(bytes) => self.store_later(key, bytes, policy.clone()),
                    Err(e) => warn!(key = %key, error = %e, "Response could not be serialized, not cached"),
                }
                Ok(Intercepted {
                    value,
                    status: CacheStatus::Miss,
                })
            }
        }
    }

    /// Waits for every queued cache write to finish. Concurrent callers are
    /// served one after another.
    pub async fn flush(&self) {
        let _guard = self.flushing.lock().await;
        self.pending.close();
        self.pending.wait().await;
        self.pending.reopen();
    }

    /// Number of cache writes still in flight.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    fn store_later(&self, key: CacheKey, bytes: Vec<u8>, policy: RoutePolicy) {
        let engine = Arc::clone(&self.engine);
        self.pending.spawn(async move {
            engine
                .set(key.as_str(), bytes, policy.ttl, &policy.tags)
                .await;
        });
    }
}
