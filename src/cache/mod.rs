//! Cache Module
//!
//! Two-tier caching: an in-process local tier with TTL expiry, an optional
//! shared remote tier, and a tag index for bulk invalidation, all
//! coordinated by [`CacheEngine`].

mod engine;
mod entry;
mod key;
mod local;
mod remote;
mod stats;
mod tags;


// Re-export public types
pub use engine::CacheEngine;
pub use entry::CacheEntry;
pub use key::{derive_key, CacheKey};
pub use local::LocalStore;
pub use remote::{connect_remote, NoopStore, RedisStore, RemoteStore, RemoteTier};
pub use stats::{CacheStats, StatsRecorder};
pub use tags::TagIndex;

// == Public Constants ==
/// Maximum key length accepted by the local tier, in bytes
pub const MAX_KEY_LENGTH: usize = 1024;

/// Maximum value size accepted by the local tier, in bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MB
