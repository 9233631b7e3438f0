//! Redis remote store using a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::cache::RemoteStore;
use crate::config::Config;
use crate::error::{CacheError, Result};

type RedisPool = Pool<Client>;

/// Redis-backed shared tier. Every key is stored as `<namespace>:<key>`.
pub struct RedisStore {
    pool: RedisPool,
    namespace: String,
}

impl RedisStore {
    /// Builds the pool without dialing; connections are opened on first use,
    /// so a backend that is down at startup can still be used once it recovers.
    pub fn new(url: &str, config: &Config) -> Result<Self> {
        let client = Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;

        // bb8 rejects a zero pool size or connection timeout
        let pool = Pool::builder()
            .max_size(config.redis_pool_size.max(1))
            .connection_timeout(Duration::from_secs(config.redis_connect_timeout.max(1)))
            .build_unchecked(client);

        Ok(Self {
            pool,
            namespace: config.namespace.clone(),
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        namespaced(&self.namespace, key)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

fn namespaced(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}

/// `KEYS` pattern matching every key under `namespace`.
///
/// Glob metacharacters in the namespace are escaped. The pattern still
/// matches a namespace nested under this one (`<ns>:other:*`), so tenants
/// sharing a backend should not use namespaces that prefix each other.
fn clear_pattern(namespace: &str) -> String {
    let mut pattern = String::with_capacity(namespace.len() + 2);
    for c in namespace.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str(":*");
    pattern
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let value: Option<Vec<u8>> = conn_ref.get(&prefixed).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        if ttl.is_zero() {
            conn_ref.set::<_, _, ()>(&prefixed, value).await?;
        } else {
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            conn_ref
                .pset_ex::<_, _, ()>(&prefixed, value, millis)
                .await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref.del::<_, ()>(&prefixed).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let pattern = clear_pattern(&self.namespace);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(conn_ref)
            .await?;

        if !keys.is_empty() {
            let conn_ref: &mut MultiplexedConnection = &mut conn;
            conn_ref.del::<_, ()>(keys).await?;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
