//! NoOp remote store.
//!
//! Used in memory-only mode when no backend URL is configured.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::RemoteStore;
use crate::error::Result;

/// A remote store that stores nothing and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
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

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_store_never_holds_values() {
        let store = NoopStore::new();

        store
            .set("k", b"v".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.delete("k").await.is_ok());
        assert!(store.clear().await.is_ok());
    }
}
