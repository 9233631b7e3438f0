//! Cache Entry Module
//!
//! Defines the structure for individual local-tier entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single entry held by the local tier.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Vec<u8>,
    /// When the entry was written
    pub created_at: Instant,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// A zero TTL means the entry never expires.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = if ttl.is_zero() {
            None
        } else {
            now.checked_add(ttl)
        };

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is at or past its expiration
    /// instant, so a fully elapsed TTL is never served.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
