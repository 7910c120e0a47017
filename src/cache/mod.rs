//! Redis cache layer
//!
//! Reference data (countries, currencies, languages, sites, rooms) changes
//! rarely and is cached for 24 hours; individual records fetched by GUID are
//! cached for 10 minutes. Services bypass reads when the request carried
//! `Cache-Control: no-cache` and invalidate on every write.

use crate::config::RedisConfig;
use crate::error::{ApiError, Result};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cache key prefixes
mod keys {
    pub const REFERENCE: &str = "registra:reference";
    pub const RECORD: &str = "registra:record";
}

/// Default TTLs
mod ttl {
    pub const REFERENCE_SECS: u64 = 86_400; // 24 hours
    pub const RECORD_SECS: u64 = 600; // 10 minutes
}

/// Cache manager for Redis operations
#[derive(Clone)]
pub struct CacheManager {
    conn: ConnectionManager,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            ApiError::Internal(anyhow::anyhow!("Failed to create Redis client: {}", e))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            ApiError::Internal(anyhow::anyhow!("Failed to connect to Redis: {}", e))
        })?;

        Ok(Self { conn })
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => {
                let parsed = serde_json::from_str(&v).map_err(|e| {
                    ApiError::Internal(anyhow::anyhow!("Cache deserialize error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(value).map_err(|e| {
            ApiError::Internal(anyhow::anyhow!("Cache serialize error: {}", e))
        })?;

        let _: () = conn.set_ex(key, serialized, ttl.as_secs()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Liveness probe used by the readiness endpoint
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    // ==================== Reference collection cache ====================

    /// Get a cached reference collection for a resource
    pub async fn get_reference<T: DeserializeOwned>(&self, resource: &str) -> Result<Option<T>> {
        let key = format!("{}:{}", keys::REFERENCE, resource);
        self.get(&key).await
    }

    /// Cache a reference collection for a resource (24 hour TTL)
    pub async fn set_reference<T: Serialize>(&self, resource: &str, value: &T) -> Result<()> {
        let key = format!("{}:{}", keys::REFERENCE, resource);
        self.set(&key, value, Duration::from_secs(ttl::REFERENCE_SECS))
            .await
    }

    /// Invalidate the cached collection for a resource
    pub async fn invalidate_reference(&self, resource: &str) -> Result<()> {
        let key = format!("{}:{}", keys::REFERENCE, resource);
        self.delete(&key).await
    }

    // ==================== Record cache ====================

    /// Get a cached record by resource and GUID
    pub async fn get_record<T: DeserializeOwned>(
        &self,
        resource: &str,
        guid: &str,
    ) -> Result<Option<T>> {
        let key = format!("{}:{}:{}", keys::RECORD, resource, guid);
        self.get(&key).await
    }

    /// Cache a record by resource and GUID (10 minute TTL)
    pub async fn set_record<T: Serialize>(
        &self,
        resource: &str,
        guid: &str,
        value: &T,
    ) -> Result<()> {
        let key = format!("{}:{}:{}", keys::RECORD, resource, guid);
        self.set(&key, value, Duration::from_secs(ttl::RECORD_SECS))
            .await
    }

    /// Invalidate a cached record
    pub async fn invalidate_record(&self, resource: &str, guid: &str) -> Result<()> {
        let key = format!("{}:{}:{}", keys::RECORD, resource, guid);
        self.delete(&key).await
    }
}
