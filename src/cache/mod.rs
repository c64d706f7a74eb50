//! Cache
//!
//! Caché no autoritativa de perfiles y preferencias. `RedisClient` en
//! producción, `MemoryCache` en desarrollo y tests; ambos detrás de
//! `CacheOperations`.

pub mod cache_config;
pub mod memory_cache;
pub mod profile_cache;
pub mod redis_client;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

pub use cache_config::CacheConfig;
pub use memory_cache::MemoryCache;
pub use profile_cache::{ProfileCache, ProfileSnapshot, Theme};
pub use redis_client::RedisClient;

/// Operaciones básicas de cache (valores serializados como JSON)
#[async_trait::async_trait]
pub trait CacheOperations {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Backend elegido al arrancar
#[derive(Clone)]
pub enum CacheBackend {
    Redis(RedisClient),
    Memory(MemoryCache),
}

impl CacheBackend {
    /// Redis si hay `redis_url`, si no caché en memoria
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        match &config.redis_url {
            Some(_) => Ok(CacheBackend::Redis(RedisClient::new(config.clone()).await?)),
            None => {
                info!("🧠 REDIS_URL no definido, usando caché en memoria");
                Ok(CacheBackend::Memory(MemoryCache::new()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory(_) => "memory",
        }
    }
}

#[async_trait::async_trait]
impl CacheOperations for CacheBackend {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self {
            CacheBackend::Redis(client) => client.get(key).await,
            CacheBackend::Memory(cache) => cache.get(key).await,
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()> {
        match self {
            CacheBackend::Redis(client) => client.set(key, value, ttl).await,
            CacheBackend::Memory(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self {
            CacheBackend::Redis(client) => client.delete(key).await,
            CacheBackend::Memory(cache) => cache.delete(key).await,
        }
    }
}
