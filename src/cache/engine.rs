//! Cache Engine Module
//!
//! Coordinates the local tier, the remote tier and the tag index. Every
//! operation is best-effort: failures in either tier are logged and never
//! reach the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{
    connect_remote, CacheStats, LocalStore, RemoteStore, RemoteTier, StatsRecorder, TagIndex,
};
use crate::config::Config;

// == Cache Engine ==
/// Two-tier cache with tag-based invalidation.
///
/// Each engine owns its own tag index, so several independent engines can
/// live in one process.
pub struct CacheEngine {
    local: LocalStore,
    remote: RemoteTier,
    tags: TagIndex,
    default_ttl: Duration,
    stats: StatsRecorder,
}

impl CacheEngine {
    // == Constructors ==
    /// Creates an engine over the given shared backend.
    pub fn new(remote: Arc<dyn RemoteStore>, default_ttl: Duration) -> Self {
        Self {
            local: LocalStore::new(),
            remote: RemoteTier::new(remote, None),
            tags: TagIndex::new(),
            default_ttl,
            stats: StatsRecorder::new(),
        }
    }

    /// Creates an engine with no shared backend.
    pub fn memory_only(default_ttl: Duration) -> Self {
        Self::new(Arc::new(crate::cache::NoopStore::new()), default_ttl)
    }

    /// Creates an engine from process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(connect_remote(config), config.default_ttl)
            .with_remote_timeout(config.remote_timeout)
    }

    /// Bounds every remote operation by `timeout`.
    pub fn with_remote_timeout(self, timeout: Option<Duration>) -> Self {
        Self {
            remote: self.remote.with_timeout(timeout),
            ..self
        }
    }

    /// TTL used when a caller omits one and when warming from the remote tier.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Looks the key up locally, then remotely.
    ///
    /// A remote hit warms the local tier with the engine default TTL, since
    /// the remote tier does not report the TTL the value was stored with.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(value) = self.local.get(key) {
            self.stats.record_local_hit();
            debug!(key, "Cache hit in local tier");
            return Some(value);
        }

        if let Some(value) = self.remote.get(key).await {
            if let Err(e) = self.local.set(key, value.clone(), self.default_ttl) {
                warn!(key, error = %e, "Failed to warm local tier");
            }
            self.stats.record_remote_hit();
            debug!(key, "Cache hit in remote tier");
            return Some(value);
        }

        self.stats.record_miss();
        None
    }

    // == Set ==
    /// Stores a value in both tiers and records its tags.
    ///
    /// The local write comes first. A failure in either tier is logged and
    /// does not stop the other; the call itself always succeeds.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>, tags: &[String]) {
        let ttl = ttl.unwrap_or(self.default_ttl);

        match self.local.set(key, value.clone(), ttl) {
            Ok(()) => debug!(key, "Cache set in local tier"),
            Err(e) => warn!(key, error = %e, "Local cache set failed"),
        }

        if !self.remote.set(key, value, ttl).await {
            debug!(key, "Value saved only to local tier");
        }

        for tag in tags {
            self.tags.associate(tag, key);
        }
        self.stats.record_set();
    }

    // == Del ==
    /// Removes a key from both tiers and from every tag. Idempotent.
    pub async fn del(&self, key: &str) {
        self.local.delete(key);
        self.remote.delete(key).await;
        self.tags.untrack(key);
        self.stats.record_delete();
        debug!(key, "Cache deleted");
    }

    // == Invalidate Tags ==
    /// Deletes every key recorded under each tag, then drops the tag.
    ///
    /// Only the keys present when the sweep starts are removed. A key tagged
    /// while the sweep is running keeps its tag and stays reachable by the
    /// next invalidation. Unknown tags are skipped.
    pub async fn invalidate_tags(&self, tags: &[String]) {
        for tag in tags {
            let keys = self.tags.keys_for(tag);
            if keys.is_empty() {
                continue;
            }

            for key in &keys {
                self.del(key).await;
            }
            self.tags.drop_tag(tag, &keys);
            self.stats.record_invalidated_tag();
            debug!(tag = %tag, keys = keys.len(), "Cache invalidated for tag");
        }
    }

    // == Clear ==
    /// Empties both tiers and resets the tag index.
    pub async fn clear(&self) {
        self.local.clear();
        self.remote.clear().await;
        self.tags.clear();
        info!("All cache cleared");
    }

    // == Shutdown ==
    /// Teardown hook: releases everything the engine holds.
    pub async fn shutdown(&self) {
        self.clear().await;
    }

    // == Typed Helpers ==
    /// Reads a JSON-encoded value. Undecodable payloads count as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Cached value could not be decoded");
                None
            }
        }
    }

    /// Stores a value as JSON. Values that fail to serialize are not cached.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        tags: &[String],
    ) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, bytes, ttl, tags).await,
            Err(e) => warn!(key, error = %e, "Value could not be serialized, not cached"),
        }
    }

    // == Maintenance ==
    /// Drops expired entries from the local tier.
    pub fn purge_expired(&self) -> usize {
        self.local.purge_expired()
    }

    /// Returns a snapshot of the engine counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.local.len(), self.tags.len(), self.remote.failures())
    }

    /// Keys currently recorded under `tag`.
    pub fn tagged_keys(&self, tag: &str) -> Vec<String> {
        let mut keys: Vec<String> = self.tags.keys_for(tag).into_iter().collect();
        keys.sort();
        keys
    }

    pub fn remote_backend(&self) -> &'static str {
        self.remote.backend_name()
    }
}
