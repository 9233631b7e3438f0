//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.
//! Values are read once at startup and are immutable afterwards.

use std::env;
use std::time::Duration;

/// Default TTL applied when a caller does not supply one (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Default namespace prefix for keys in the shared backend.
pub const DEFAULT_NAMESPACE: &str = "response-cache";

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared backend URL; `None` runs the cache in memory-only mode
    pub redis_url: Option<String>,
    /// TTL applied when a caller omits one, and when warming from the remote tier
    pub default_ttl: Duration,
    /// Prefix separating this cache's keys from other tenants of the backend
    pub namespace: String,
    /// Maximum pooled connections to the backend
    pub redis_pool_size: u32,
    /// Seconds to wait for a pooled connection
    pub redis_connect_timeout: u64,
    /// Optional per-operation timeout on remote calls
    pub remote_timeout: Option<Duration>,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Shared backend URL (default: unset, memory-only)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_NAMESPACE` - Backend key prefix (default: "response-cache")
    /// - `REDIS_POOL_SIZE` - Backend connection pool size (default: 4)
    /// - `REDIS_CONNECT_TIMEOUT` - Pool checkout timeout in seconds (default: 5)
    /// - `REMOTE_TIMEOUT_MS` - Per-operation remote timeout (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            redis_url: lookup("REDIS_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            default_ttl: parsed("DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            namespace: lookup("CACHE_NAMESPACE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.namespace),
            redis_pool_size: lookup("REDIS_POOL_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.redis_pool_size),
            redis_connect_timeout: parsed("REDIS_CONNECT_TIMEOUT")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.redis_connect_timeout),
            remote_timeout: parsed("REMOTE_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: parsed("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Returns true when no shared backend is configured.
    pub fn is_memory_only(&self) -> bool {
        self.redis_url.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
            namespace: DEFAULT_NAMESPACE.to_string(),
            redis_pool_size: 4,
            redis_connect_timeout: 5,
            remote_timeout: None,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
