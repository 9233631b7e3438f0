//! Response Cache - a two-tier response caching engine
//!
//! Caches handler results in a per-process TTL store backed by an optional
//! shared Redis tier, with tag-based invalidation and an axum middleware
//! that applies per-route cache policies.

pub mod api;
pub mod cache;
pub mod config;
pub mod demo;
pub mod error;
pub mod intercept;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState, CachedRoute};
pub use cache::{derive_key, CacheEngine, CacheKey, CacheStats, RemoteStore};
pub use config::Config;
pub use error::{CacheError, Result};
pub use intercept::{CacheInterceptor, CacheStatus, RequestInfo, RoutePolicy};
pub use tasks::spawn_cleanup_task;
