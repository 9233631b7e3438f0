//! Local Store Module
//!
//! In-process tier: a sharded concurrent map with per-entry TTL. Expired
//! entries are dropped lazily on read and by the background sweep.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::cache::{CacheEntry, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Local Store ==
/// Fast in-process key/value tier. Never performs I/O.
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: DashMap<String, CacheEntry>,
}

impl LocalStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    // == Get ==
    /// Returns the value if present and not expired.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired_at(now) {
                return Some(entry.value.clone());
            }
        }

        // Only drop it if a concurrent set has not replaced it meanwhile
        self.entries
            .remove_if(key, |_, entry| entry.is_expired_at(now));
        None
    }

    // == Set ==
    /// Inserts or replaces a value, resetting its expiry to now + `ttl`.
    ///
    /// A zero TTL stores the value without expiry.
    pub fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before.saturating_sub(self.entries.len())
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store = LocalStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = LocalStore::new();

        store.set("key1", b"value1".to_vec(), TTL).unwrap();

        assert_eq!(store.get("key1"), Some(b"value1".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = LocalStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_delete() {
        let store = LocalStore::new();

        store.set("key1", b"value1".to_vec(), TTL).unwrap();
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let store = LocalStore::new();
        store.set("other", b"v".to_vec(), TTL).unwrap();

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let store = LocalStore::new();

        store.set("key1", b"value1".to_vec(), TTL).unwrap();
        store.set("key1", b"value2".to_vec(), TTL).unwrap();

        assert_eq!(store.get("key1"), Some(b"value2".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let store = LocalStore::new();

        store
            .set("key1", b"short".to_vec(), Duration::from_millis(20))
            .unwrap();
        store.set("key1", b"long".to_vec(), TTL).unwrap();
        sleep(Duration::from_millis(40));

        assert_eq!(store.get("key1"), Some(b"long".to_vec()));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = LocalStore::new();

        store
            .set("key1", b"value1".to_vec(), Duration::from_millis(1))
            .unwrap();
        sleep(Duration::from_millis(20));

        assert!(store.get("key1").is_none());
        // Lazy expiry removed it on read
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_zero_ttl_never_expires() {
        let store = LocalStore::new();

        store.set("forever", b"v".to_vec(), Duration::ZERO).unwrap();
        sleep(Duration::from_millis(20));

        assert_eq!(store.get("forever"), Some(b"v".to_vec()));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_store_purge_expired() {
        let store = LocalStore::new();

        store
            .set("key1", b"value1".to_vec(), Duration::from_millis(10))
            .unwrap();
        store.set("key2", b"value2".to_vec(), TTL).unwrap();
        sleep(Duration::from_millis(30));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_clear() {
        let store = LocalStore::new();
        store.set("a", b"1".to_vec(), TTL).unwrap();
        store.set("b", b"2".to_vec(), TTL).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_store_key_too_long() {
        let store = LocalStore::new();
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(&long_key, b"value".to_vec(), TTL);
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_value_too_large() {
        let store = LocalStore::new();
        let large_value = vec![b'x'; MAX_VALUE_SIZE + 1];

        let result = store.set("key", large_value, TTL);
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[test]
    fn test_store_concurrent_writers_on_distinct_keys() {
        let store = Arc::new(LocalStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{t}-k{i}");
                        store.set(&key, key.clone().into_bytes(), TTL).unwrap();
                        assert_eq!(store.get(&key), Some(key.into_bytes()));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8 * 200);
    }
}
