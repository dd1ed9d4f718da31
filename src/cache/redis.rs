//! Redis cache store.
//!
//! The serialization-boundary flavor: entries cross the wire as JSON
//! strings, serialized and deserialized inside this implementation so the
//! gateway never sees the boundary.
//!
//! Redis enumerates keys natively (`SCAN`), so this store declares
//! [`FlushSupport::PrefixScan`] and collection flushes bypass the key index
//! entirely.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::entry::CachedEntry;
use super::traits::{CacheError, CacheStore, FlushSupport};

pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to a Redis instance (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(Self { connection })
    }

    /// Wrap an existing connection manager (for sharing a pool).
    #[must_use]
    pub fn with_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Escape glob metacharacters so a key prefix matches literally in
    /// `SCAN MATCH`. Predicate-derived keys contain `[` and `]`.
    fn glob_escape(prefix: &str) -> String {
        let mut escaped = String::with_capacity(prefix.len());
        for c in prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, CacheError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        match raw {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        entry: CachedEntry,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(&entry).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.connection.clone();
        match ttl {
            Some(ttl) => {
                // Round up so sub-second TTLs still persist.
                let secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, payload, secs)
                    .await
                    .map_err(|e| CacheError::Unavailable(e.to_string()))
            }
            None => conn
                .set::<_, _, ()>(key, payload)
                .await
                .map_err(|e| CacheError::Unavailable(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }

    fn flush_support(&self) -> FlushSupport {
        FlushSupport::PrefixScan
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = format!("{}*", Self::glob_escape(prefix));
        let mut conn = self.connection.clone();

        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| CacheError::Unavailable(e.to_string()))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: u64 = conn
            .del(&keys)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(deleted)
    }
}
